//! Users handler: cached, gate-limited batch lookups over the user catalog.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gofed_domain::cache::{BoundedCache, CacheStats};
use gofed_domain::gate::{AdmissionGate, GateStats};
use gofed_domain::model::User;
use gofed_domain::resolver::{BatchResolver, ResolutionRequest, ResolverConfig, ResolverStats};
use gofed_storage::CatalogStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::{record_batch_outcome, sample_gate_while};
use crate::adapters::UserSource;
use crate::errors::{ServiceError, ServiceResult};
use crate::observability::metrics;

/// Serves user queries through a shared record cache.
///
/// Cache hits are answered without taking a gate slot. Misses are fetched
/// under the gate and written back to the cache.
pub struct UsersHandler {
    service: String,
    catalog: Arc<dyn CatalogStore>,
    cache: Arc<BoundedCache<User>>,
    resolver: BatchResolver<UserSource>,
}

impl UsersHandler {
    pub fn new(
        service: impl Into<String>,
        catalog: Arc<dyn CatalogStore>,
        gate: Arc<AdmissionGate>,
        cache: Arc<BoundedCache<User>>,
        latency: Duration,
        config: ResolverConfig,
    ) -> Self {
        let source = Arc::new(UserSource::new(Arc::clone(&catalog), latency));
        let resolver = BatchResolver::new(source, gate)
            .with_cache(Arc::clone(&cache))
            .with_config(config);
        Self {
            service: service.into(),
            catalog,
            cache,
            resolver,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Resolves `ids`, serving cached users first.
    ///
    /// Returns the users found, in request order. Unknown ids are left out.
    #[instrument(skip(self, cancel, ids), fields(service = %self.service, batch_size = ids.len()))]
    pub async fn users_by_ids(
        &self,
        cancel: &CancellationToken,
        ids: &[String],
    ) -> ServiceResult<Vec<User>> {
        let started = Instant::now();
        let request = ResolutionRequest::new(ids.iter().cloned());

        let resolving = self.resolver.resolve_batch(cancel, request);
        let result = sample_gate_while(&self.service, self.resolver.gate(), resolving)
            .await
            .map_err(ServiceError::from)
            .map(|resolution| {
                let cached = resolution.items().iter().filter(|i| i.from_cache).count();
                let failures = resolution.error_count();
                if failures > 0 {
                    warn!(failures, "some user fetches failed");
                }
                debug!(cached, "served users from cache");
                resolution.into_records()
            });

        metrics::record_cache_stats(&self.service, &self.cache.stats());
        record_batch_outcome(&self.service, ids.len(), started, &result);

        if let Ok(users) = &result {
            info!(
                found = users.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "resolved users"
            );
        }
        result
    }

    /// Returns one user, from the cache when present.
    ///
    /// A miss is fetched like any batch unit: it waits for a gate slot and
    /// then populates the cache.
    pub async fn user(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> ServiceResult<Option<User>> {
        let resolution = self
            .resolver
            .resolve_batch(cancel, ResolutionRequest::new([id]))
            .await?;

        match resolution.into_items().pop() {
            Some(item) => {
                if let Some(error) = &item.error {
                    warn!(id, %error, "user fetch failed");
                }
                Ok(item.record)
            }
            None => Ok(None),
        }
    }

    /// Returns every user in the catalog.
    pub async fn users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.catalog.list_users().await?)
    }

    /// Returns a snapshot of the cached users, oldest first.
    pub fn cached_users(&self) -> Vec<User> {
        self.cache.list()
    }

    /// Returns cache occupancy and publishes it as gauges.
    pub fn cache_stats(&self) -> CacheStats {
        let stats = self.cache.stats();
        metrics::record_cache_stats(&self.service, &stats);
        stats
    }

    /// Drops every cached user.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!(service = %self.service, "user cache cleared");
    }

    /// Drops cached users past their TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let purged = self.cache.purge_expired();
        if purged > 0 {
            debug!(service = %self.service, purged, "purged expired users");
        }
        purged
    }

    pub fn gate_stats(&self) -> GateStats {
        self.resolver.gate().stats()
    }

    pub fn resolver_stats(&self) -> ResolverStats {
        self.resolver.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofed_domain::cache::BoundedCacheConfig;
    use gofed_storage::MemoryCatalog;

    fn handler(cache_capacity: usize) -> UsersHandler {
        UsersHandler::new(
            "users",
            MemoryCatalog::seeded_shared(),
            Arc::new(AdmissionGate::new(3).unwrap()),
            Arc::new(BoundedCache::new(BoundedCacheConfig::new(cache_capacity)).unwrap()),
            Duration::ZERO,
            ResolverConfig::default(),
        )
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_users_by_ids_populates_cache() {
        let handler = handler(10);

        let users = handler
            .users_by_ids(&CancellationToken::new(), &ids(&["1", "2"]))
            .await
            .unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(handler.cache_stats().size, 2);
        let cached: Vec<String> = handler.cached_users().into_iter().map(|u| u.id).collect();
        assert_eq!(cached.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_return_no_users() {
        let handler = handler(10);

        let users = handler
            .users_by_ids(&CancellationToken::new(), &ids(&["999", "998", "997"]))
            .await
            .unwrap();

        assert!(users.is_empty());
        assert_eq!(handler.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn test_user_lookup_reads_through_cache() {
        let handler = handler(10);
        let token = CancellationToken::new();

        let first = handler.user(&token, "3").await.unwrap().unwrap();
        let second = handler.user(&token, "3").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name, "Charlie");
        let stats = handler.cache_stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_user_miss_waits_for_gate_slot() {
        let gate = Arc::new(AdmissionGate::new(1).unwrap());
        let handler = UsersHandler::new(
            "users",
            MemoryCatalog::seeded_shared(),
            Arc::clone(&gate),
            Arc::new(BoundedCache::new(BoundedCacheConfig::new(10)).unwrap()),
            Duration::ZERO,
            ResolverConfig::default(),
        );
        let token = CancellationToken::new();
        let held = gate.try_acquire().unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(100), handler.user(&token, "3")).await;
        assert!(blocked.is_err(), "lookup must not bypass a saturated gate");
        assert_eq!(handler.cache_stats().size, 0);

        held.release();
        let user = handler.user(&token, "3").await.unwrap().unwrap();

        assert_eq!(user.name, "Charlie");
        assert_eq!(handler.cache_stats().size, 1);
        assert_eq!(gate.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_user_lookup_honours_cancellation() {
        let handler = handler(10);
        let token = CancellationToken::new();
        token.cancel();

        let err = handler.user(&token, "3").await.unwrap_err();

        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn test_clear_cache_empties_it() {
        let handler = handler(10);
        handler
            .users_by_ids(&CancellationToken::new(), &ids(&["1", "2", "3"]))
            .await
            .unwrap();

        handler.clear_cache();

        assert!(handler.cached_users().is_empty());
    }

    #[tokio::test]
    async fn test_small_cache_keeps_most_recent_users() {
        let handler = handler(2);

        let token = CancellationToken::new();
        for id in ["1", "2", "3"] {
            handler.user(&token, id).await.unwrap();
        }

        let cached: Vec<String> = handler.cached_users().into_iter().map(|u| u.id).collect();
        assert_eq!(cached, ids(&["2", "3"]));
    }
}
