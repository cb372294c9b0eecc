//! Fan-out/fan-in resolver bounded by an admission gate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::config::ResolverConfig;
use super::traits::RecordSource;
use super::types::{ResolutionRequest, ResolutionResult, ResolvedItem, ResolverStats};
use crate::cache::BoundedCache;
use crate::error::{ResolverError, ResolverResult};
use crate::gate::{AdmissionGate, GatePermit};

/// Counters backing [`ResolverStats`].
#[derive(Debug, Default)]
struct ResolverMetrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    source_failures: AtomicU64,
    cancelled_units: AtomicU64,
}

impl ResolverMetrics {
    fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            source_failures: self.source_failures.load(Ordering::Relaxed),
            cancelled_units: self.cancelled_units.load(Ordering::Relaxed),
        }
    }
}

/// Resolves batches of keys against a [`RecordSource`].
///
/// The gate and the optional cache are shared with every other user of the
/// same `Arc`s, so several resolvers (or handlers) can be bounded by one gate.
pub struct BatchResolver<S: RecordSource> {
    source: Arc<S>,
    gate: Arc<AdmissionGate>,
    cache: Option<Arc<BoundedCache<S::Record>>>,
    config: ResolverConfig,
    metrics: Arc<ResolverMetrics>,
}

impl<S: RecordSource> std::fmt::Debug for BatchResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchResolver")
            .field("gate", &self.gate)
            .field("cached", &self.cache.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<S: RecordSource> BatchResolver<S> {
    /// Creates a resolver without a cache, using the default configuration.
    pub fn new(source: Arc<S>, gate: Arc<AdmissionGate>) -> Self {
        Self {
            source,
            gate,
            cache: None,
            config: ResolverConfig::default(),
            metrics: Arc::new(ResolverMetrics::default()),
        }
    }

    /// Serves hits from `cache` and populates it after each successful fetch.
    pub fn with_cache(mut self, cache: Arc<BoundedCache<S::Record>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the resolver configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    pub fn cache(&self) -> Option<&Arc<BoundedCache<S::Record>>> {
        self.cache.as_ref()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns a snapshot of the resolver counters.
    pub fn stats(&self) -> ResolverStats {
        self.metrics.snapshot()
    }

    /// Resolves every key in `request`, preserving request order.
    ///
    /// Returns early with [`ResolverError::Cancelled`] or
    /// [`ResolverError::Timeout`] as soon as any unit is interrupted while
    /// waiting for a gate slot. Units that already hold a slot keep running
    /// in the background.
    pub async fn resolve_batch(
        &self,
        cancel: &CancellationToken,
        request: ResolutionRequest,
    ) -> ResolverResult<ResolutionResult<S::Record>> {
        request.validate(self.config.max_batch_size)?;
        if request.is_empty() {
            return Ok(ResolutionResult::empty());
        }

        let started = std::time::Instant::now();
        let batch_size = request.len();
        debug!(batch_size, "resolving batch");

        // Interrupts this call's waiting units on early return or when the
        // caller drops the future.
        let call_token = cancel.child_token();
        let _call_guard = call_token.clone().drop_guard();
        let deadline = self
            .config
            .timeout
            .map(|timeout| (Instant::now() + timeout, timeout));

        let mut pending: FuturesUnordered<_> = request
            .into_keys()
            .into_iter()
            .enumerate()
            .map(|(index, key)| {
                let unit = WorkUnit {
                    key: key.clone(),
                    source: Arc::clone(&self.source),
                    gate: Arc::clone(&self.gate),
                    cache: self.cache.clone(),
                    metrics: Arc::clone(&self.metrics),
                    cancel: call_token.clone(),
                    deadline,
                };
                let handle = tokio::spawn(unit.run());
                async move { (index, key, handle.await) }
            })
            .collect();

        let mut slots: Vec<Option<ResolvedItem<S::Record>>> =
            std::iter::repeat_with(|| None).take(batch_size).collect();

        while let Some((index, key, joined)) = pending.next().await {
            let item = match joined {
                Ok(Ok(item)) => item,
                Ok(Err(err)) => {
                    call_token.cancel();
                    debug!(
                        batch_size,
                        error = %err,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "batch aborted"
                    );
                    return Err(err);
                }
                Err(join_err) => {
                    warn!(key = %key, error = %join_err, "work unit panicked");
                    self.metrics.source_failures.fetch_add(1, Ordering::Relaxed);
                    ResolvedItem::failed(key, format!("work unit failed: {join_err}"))
                }
            };
            slots[index] = Some(item);
        }

        debug!(
            batch_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch resolved"
        );
        Ok(ResolutionResult::new(slots.into_iter().flatten().collect()))
    }
}

/// Everything one spawned task needs to resolve a single key.
struct WorkUnit<S: RecordSource> {
    key: String,
    source: Arc<S>,
    gate: Arc<AdmissionGate>,
    cache: Option<Arc<BoundedCache<S::Record>>>,
    metrics: Arc<ResolverMetrics>,
    cancel: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl<S: RecordSource> WorkUnit<S> {
    async fn run(self) -> ResolverResult<ResolvedItem<S::Record>> {
        if let Some(cache) = &self.cache {
            if let Some(record) = cache.get(&self.key) {
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %self.key, "served from cache");
                return Ok(ResolvedItem::cached(self.key, record));
            }
            self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
        }

        let permit = match self.acquire_slot().await {
            Ok(permit) => permit,
            Err(err) => {
                self.metrics.cancelled_units.fetch_add(1, Ordering::Relaxed);
                trace!(key = %self.key, error = %err, "unit interrupted while waiting");
                return Err(err);
            }
        };

        let fetched = self.source.fetch(&self.key).await;
        let item = match fetched {
            Ok(Some(record)) => {
                if let Some(cache) = &self.cache {
                    cache.set(self.key.clone(), record.clone());
                }
                ResolvedItem::found(self.key, record)
            }
            Ok(None) => ResolvedItem::missing(self.key),
            Err(err) => {
                self.metrics.source_failures.fetch_add(1, Ordering::Relaxed);
                warn!(key = %self.key, error = %err, "backing source failed");
                ResolvedItem::failed(self.key, err.to_string())
            }
        };

        permit.release();
        Ok(item)
    }

    async fn acquire_slot(&self) -> ResolverResult<GatePermit> {
        match self.deadline {
            Some((deadline, timeout)) => {
                match timeout_at(deadline, self.gate.acquire(&self.cancel)).await {
                    Ok(result) => Ok(result?),
                    Err(_) => Err(ResolverError::Timeout {
                        duration_ms: timeout.as_millis() as u64,
                    }),
                }
            }
            None => Ok(self.gate.acquire(&self.cancel).await?),
        }
    }
}
