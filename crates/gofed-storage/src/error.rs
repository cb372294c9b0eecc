//! Storage error types.

use gofed_domain::error::SourceError;
use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Invalid input error.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Record already exists.
    #[error("{kind} already exists: {id}")]
    DuplicateRecord { kind: &'static str, id: String },

    /// The catalog could not serve the request.
    #[error("catalog unavailable: {message}")]
    Unavailable { message: String },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for SourceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { message } => SourceError::Unavailable { message },
            other => SourceError::Internal {
                message: other.to_string(),
            },
        }
    }
}
