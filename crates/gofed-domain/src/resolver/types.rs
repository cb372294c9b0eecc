//! Request and result types for batch resolution.

use serde::Serialize;

use crate::error::{ResolverError, ResolverResult};

/// Ordered list of keys to resolve.
///
/// Duplicates are allowed and resolve independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionRequest {
    keys: Vec<String>,
}

impl ResolutionRequest {
    /// Creates a request from any iterator of keys.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the keys in request order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Checks the request against the batch size limit and rejects empty keys.
    pub fn validate(&self, max_batch_size: usize) -> ResolverResult<()> {
        if self.keys.len() > max_batch_size {
            return Err(ResolverError::BatchTooLarge {
                size: self.keys.len(),
                max: max_batch_size,
            });
        }

        if let Some(index) = self.keys.iter().position(|key| key.is_empty()) {
            return Err(ResolverError::InvalidKey { index });
        }

        Ok(())
    }

    pub(crate) fn into_keys(self) -> Vec<String> {
        self.keys
    }
}

impl From<Vec<String>> for ResolutionRequest {
    fn from(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

/// Outcome for one position of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItem<R> {
    /// The key requested at this position.
    pub key: String,
    /// The record, or `None` if the source had none or failed.
    pub record: Option<R>,
    /// Backing-source failure for this key, if any.
    pub error: Option<String>,
    /// True if the record was served from the cache without a fetch.
    pub from_cache: bool,
}

impl<R> ResolvedItem<R> {
    pub(crate) fn found(key: String, record: R) -> Self {
        Self {
            key,
            record: Some(record),
            error: None,
            from_cache: false,
        }
    }

    pub(crate) fn cached(key: String, record: R) -> Self {
        Self {
            key,
            record: Some(record),
            error: None,
            from_cache: true,
        }
    }

    pub(crate) fn missing(key: String) -> Self {
        Self {
            key,
            record: None,
            error: None,
            from_cache: false,
        }
    }

    pub(crate) fn failed(key: String, error: impl Into<String>) -> Self {
        Self {
            key,
            record: None,
            error: Some(error.into()),
            from_cache: false,
        }
    }

    /// Returns true if this position carries a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-position results, aligned with the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult<R> {
    items: Vec<ResolvedItem<R>>,
}

impl<R> ResolutionResult<R> {
    pub(crate) fn new(items: Vec<ResolvedItem<R>>) -> Self {
        Self { items }
    }

    /// Creates an empty result.
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[ResolvedItem<R>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ResolvedItem<R>> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the records that were found, in request order.
    pub fn into_records(self) -> Vec<R> {
        self.items.into_iter().filter_map(|item| item.record).collect()
    }

    /// Returns the number of positions that carry a failure.
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_error()).count()
    }
}

/// Snapshot of resolver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub source_failures: u64,
    pub cancelled_units: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_key_with_index() {
        let request = ResolutionRequest::new(["1", "", "3"]);

        assert_eq!(
            request.validate(10),
            Err(ResolverError::InvalidKey { index: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_oversized_batch() {
        let request = ResolutionRequest::new(["1", "2", "3"]);

        assert_eq!(
            request.validate(2),
            Err(ResolverError::BatchTooLarge { size: 3, max: 2 })
        );
    }

    #[test]
    fn test_validate_accepts_duplicates() {
        let request = ResolutionRequest::new(["1", "1", "1"]);

        assert!(request.validate(3).is_ok());
        assert_eq!(request.len(), 3);
    }

    #[test]
    fn test_into_records_skips_missing_and_failed() {
        let result = ResolutionResult::new(vec![
            ResolvedItem::found("1".to_string(), "a"),
            ResolvedItem::missing("2".to_string()),
            ResolvedItem::failed("3".to_string(), "boom"),
            ResolvedItem::cached("4".to_string(), "d"),
        ]);

        assert_eq!(result.error_count(), 1);
        assert_eq!(result.into_records(), vec!["a", "d"]);
    }
}
