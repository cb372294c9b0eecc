//! Service-level error type.

use gofed_domain::error::{CacheError, GateError, ResolverError};
use gofed_storage::StorageError;
use thiserror::Error;

use crate::config::ConfigLoadError;

/// Errors surfaced by the products and users handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error("failed to build admission gate: {0}")]
    Gate(#[from] GateError),

    #[error("failed to build record cache: {0}")]
    Cache(#[from] CacheError),
}

impl ServiceError {
    /// Short label used for the `kind` dimension of error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Resolver(ResolverError::Cancelled) => "cancelled",
            ServiceError::Resolver(ResolverError::Timeout { .. }) => "timeout",
            ServiceError::Resolver(
                ResolverError::InvalidKey { .. } | ResolverError::BatchTooLarge { .. },
            ) => "invalid_request",
            ServiceError::Resolver(ResolverError::Gate(_)) | ServiceError::Gate(_) => "gate",
            ServiceError::Storage(StorageError::InvalidInput { .. }) => "invalid_request",
            ServiceError::Storage(_) => "storage",
            ServiceError::Config(_) | ServiceError::Cache(_) => "configuration",
        }
    }

    /// Returns true if the caller aborted the request or its deadline passed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ServiceError::Resolver(err) if err.is_cancellation())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
