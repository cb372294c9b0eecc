//! Storage abstraction consumed by the resolver.

use async_trait::async_trait;

use crate::error::SourceResult;

/// Authoritative supplier of records by key.
///
/// Implementations must be safe to call from many tasks at once; the
/// resolver bounds how many calls are in flight through its admission gate.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// The record type produced for a key.
    type Record: Clone + Send + Sync + 'static;

    /// Fetches the record for `key`.
    ///
    /// Returns `Ok(None)` when no record exists. An `Err` is reported on that
    /// key's result item only.
    async fn fetch(&self, key: &str) -> SourceResult<Option<Self::Record>>;
}
