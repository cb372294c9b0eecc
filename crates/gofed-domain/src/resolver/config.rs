//! Resolver configuration.

use std::time::Duration;

/// Default upper bound on keys per request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Configuration for the batch resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum number of keys accepted in a single request.
    pub max_batch_size: usize,
    /// Deadline applied to each call's gate waits. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            timeout: None,
        }
    }
}

impl ResolverConfig {
    /// Sets the maximum batch size.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Sets the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
