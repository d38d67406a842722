// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use lms_core::ErrorKind;

/// All possible errors that can occur in the lms-client library.
///
/// API failures arrive already normalized as [`lms_core::Error`]; the other
/// variants are local failures (configuration, token storage, input checks).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] lms_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("token store error: {0}")]
    TokenStore(String),

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("assignment {assignment_id} already has a submission\n  hint: resubmission is not allowed once work is handed in")]
    AlreadySubmitted { assignment_id: String },

    #[error("not connected to the realtime stream")]
    NotConnected,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Maps into the closed taxonomy shown by views.
    ///
    /// Local input failures read as validation errors; everything else that
    /// did not come from the server is unknown.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api(e) => e.kind(),
            Error::FieldEmpty { .. } | Error::AlreadySubmitted { .. } => ErrorKind::Validation,
            Error::NotConnected => ErrorKind::Network,
            Error::Config(_)
            | Error::TokenStore(_)
            | Error::Url(_)
            | Error::Io(_)
            | Error::Json(_) => ErrorKind::Unknown,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

/// A specialized Result type for lms-client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
