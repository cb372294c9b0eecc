//! Domain error types for admission, caching and batch resolution.

use thiserror::Error;

/// Errors raised by the admission gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The gate was configured with an unusable capacity.
    #[error("admission gate capacity must be between 1 and {max}, got {capacity}")]
    InvalidCapacity { capacity: usize, max: usize },

    /// The caller's cancellation signal fired while waiting for a slot.
    #[error("cancelled while waiting for an admission slot")]
    Cancelled,

    /// The underlying semaphore was closed.
    #[error("admission gate is closed")]
    Closed,
}

/// Errors raised by the bounded cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The cache was configured with a zero capacity.
    #[error("cache capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: usize },
}

/// Failure reported by a backing source for a single key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source could not be reached or refused the request.
    #[error("backing source unavailable: {message}")]
    Unavailable { message: String },

    /// The source failed while producing the record.
    #[error("backing source error: {message}")]
    Internal { message: String },
}

/// Errors that abort a whole batch resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// A key in the request is empty.
    #[error("invalid key at index {index}: key cannot be empty")]
    InvalidKey { index: usize },

    /// The request holds more keys than the resolver accepts.
    #[error("batch size {size} exceeds maximum allowed {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// The caller cancelled the batch before every unit was admitted.
    #[error("batch resolution cancelled")]
    Cancelled,

    /// The per-call deadline elapsed while a unit waited for a slot.
    #[error("batch resolution timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The admission gate failed for a reason other than cancellation.
    #[error("admission gate error: {0}")]
    Gate(GateError),
}

impl ResolverError {
    /// Returns true for caller-initiated aborts and elapsed deadlines.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ResolverError::Cancelled | ResolverError::Timeout { .. })
    }
}

impl From<GateError> for ResolverError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Cancelled => ResolverError::Cancelled,
            other => ResolverError::Gate(other),
        }
    }
}

/// Result type for admission gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Result type for cache construction.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for backing source fetches.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for batch resolution.
pub type ResolverResult<T> = Result<T, ResolverError>;
