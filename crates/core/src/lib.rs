//! Shared primitives for all Rust crates in the MapR ticket inspector.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across the inspector crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid configuration or violated invariant, raised before any I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Enumerating objects from the cluster failed.
    #[error("cluster error: {0}")]
    Cluster(String),

    /// A ticket payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The caller cancelled the operation.
    #[error("{0}")]
    Cancelled(String),

    /// The caller-supplied deadline passed before the operation finished.
    #[error("{0}")]
    DeadlineExceeded(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether the error originates from the caller's context rather
    /// than from the operation itself.
    #[must_use]
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled(_) | Self::DeadlineExceeded(_))
    }
}
