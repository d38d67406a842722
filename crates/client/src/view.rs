// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The four states every screen branches on.

use lms_core::models::Paginated;
use lms_core::ErrorKind;

use crate::error::Result;

/// Data that can be "nothing to show" without being an error.
pub trait Emptiness {
    fn is_empty_view(&self) -> bool;
}

impl<T> Emptiness for Vec<T> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for Paginated<T> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for Option<T> {
    fn is_empty_view(&self) -> bool {
        self.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(ErrorKind),
    Empty,
    Populated(T),
}

impl<T> ViewState<T> {
    /// Classifies a settled read with a custom emptiness predicate.
    pub fn from_result_with(result: Result<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(data) if is_empty(&data) => ViewState::Empty,
            Ok(data) => ViewState::Populated(data),
            Err(e) => ViewState::Error(e.kind()),
        }
    }

    /// Classifies a read that may still be pending.
    pub fn from_pending(result: Option<Result<T>>) -> Self
    where
        T: Emptiness,
    {
        match result {
            None => ViewState::Loading,
            Some(r) => Self::from(r),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ViewState::Empty)
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            ViewState::Error(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Populated(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Error(kind) => ViewState::Error(kind),
            ViewState::Empty => ViewState::Empty,
            ViewState::Populated(data) => ViewState::Populated(f(data)),
        }
    }

    /// Copy for the empty state, e.g. `No courses found`.
    pub fn empty_message(noun: &str) -> String {
        format!("No {} found", noun)
    }

    /// Copy for the error state.
    pub fn error_message(kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::Network => "Unable to reach the server. Check your connection and try again.",
            ErrorKind::Unauthorized => "Your session has expired. Please sign in again.",
            ErrorKind::Forbidden => "You do not have access to this content.",
            ErrorKind::Validation => "Something in the request was not valid.",
            ErrorKind::Server => "The server had a problem. Please try again later.",
            ErrorKind::Unknown => "Something went wrong.",
        }
    }
}

impl<T: Emptiness> From<Result<T>> for ViewState<T> {
    fn from(result: Result<T>) -> Self {
        Self::from_result_with(result, Emptiness::is_empty_view)
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
