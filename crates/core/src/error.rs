// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The closed error taxonomy produced by the response normalizer.
//!
//! Every transport, status and decoding failure collapses into one of six
//! kinds. Callers branch on [`ErrorKind`]; the variants carry enough detail
//! for a user-facing message.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-level detail attached to validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `items[2].title`).
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Discriminant of [`Error`], used by views and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Unauthorized,
    Forbidden,
    Validation,
    Server,
    Unknown,
}

impl ErrorKind {
    /// Returns the string representation used in logs and view states.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Validation => "validation",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All normalized API failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("network error: {0}\n  hint: check your connection and try again")]
    Network(String),

    #[error("unauthorized: session expired or missing\n  hint: sign in again")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {message}{}", format_fields(.fields))]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("unexpected error{}: {message}", format_status(.status))]
    Unknown {
        status: Option<u16>,
        message: String,
    },
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({})", code),
        None => String::new(),
    }
}

fn format_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = fields.iter().map(ToString::to_string).collect();
    format!(" ({})", joined.join("; "))
}

impl Error {
    /// Creates a validation error without field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates an unknown error with no HTTP status.
    pub fn unknown(message: impl Into<String>) -> Self {
        Error::Unknown {
            status: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Unauthorized => ErrorKind::Unauthorized,
            Error::Forbidden(_) => ErrorKind::Forbidden,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Server { .. } => ErrorKind::Server,
            Error::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns true for failures worth another attempt (network and 5xx).
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Server)
    }

    /// Field-level detail for validation failures, empty otherwise.
    pub fn fields(&self) -> &[FieldError] {
        match self {
            Error::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::validation(format!("malformed response: {}", e))
    }
}

/// A specialized Result type for lms-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
