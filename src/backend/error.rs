//! Backend error types

use thiserror::Error;

/// Failure of a single remote call
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::MalformedResponse, message)
    }
}

/// Error classification. The pipeline treats both kinds the same way;
/// the distinction only shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection failure, timeout, or a non-success HTTP status
    Transport,
    /// Body could not be decoded as the expected shape
    MalformedResponse,
}

impl BackendErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::MalformedResponse => "malformed_response",
        }
    }
}
