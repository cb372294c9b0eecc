//! Wiring of the products and users handlers from configuration.

use std::sync::Arc;

use gofed_domain::cache::{BoundedCache, BoundedCacheConfig};
use gofed_domain::gate::AdmissionGate;
use gofed_domain::resolver::ResolverConfig;
use gofed_storage::CatalogStore;
use tracing::info;

use crate::config::ServiceConfig;
use crate::errors::ServiceResult;
use crate::handlers::{ProductsHandler, UsersHandler};
use crate::observability::{init_logging, init_metrics, LoggingConfig, MetricsState};

/// Both services, built over one catalog.
///
/// Each service owns its admission gate, so a burst against one service
/// never consumes the other's slots.
pub struct Services {
    pub products: ProductsHandler,
    pub users: UsersHandler,
    config: ServiceConfig,
}

impl Services {
    /// Builds both handlers from a validated configuration.
    pub fn from_config(
        config: ServiceConfig,
        catalog: Arc<dyn CatalogStore>,
    ) -> ServiceResult<Self> {
        config.validate()?;

        let resolver_config = resolver_config(&config);
        let name = &config.service.name;

        let products = ProductsHandler::new(
            format!("{name}-products"),
            Arc::clone(&catalog),
            Arc::new(AdmissionGate::new(config.gate.capacity)?),
            config.source.products_latency(),
            resolver_config.clone(),
        );

        let mut cache_config = BoundedCacheConfig::new(config.cache.capacity);
        if let Some(ttl) = config.cache.ttl() {
            cache_config = cache_config.with_ttl(ttl);
        }
        let users = UsersHandler::new(
            format!("{name}-users"),
            catalog,
            Arc::new(AdmissionGate::new(config.gate.capacity)?),
            Arc::new(BoundedCache::new(cache_config)?),
            config.source.users_latency(),
            resolver_config,
        );

        info!(
            service = %name,
            gate_capacity = config.gate.capacity,
            cache_capacity = config.cache.capacity,
            "services initialized"
        );

        Ok(Self {
            products,
            users,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

fn resolver_config(config: &ServiceConfig) -> ResolverConfig {
    let mut resolver = ResolverConfig::default().with_max_batch_size(config.resolver.max_batch_size);
    if let Some(timeout) = config.resolver.timeout() {
        resolver = resolver.with_timeout(timeout);
    }
    resolver
}

/// Installs logging and, if enabled, the Prometheus recorder.
///
/// Returns the metrics state when a recorder was installed by this call.
pub fn init_observability(config: &ServiceConfig) -> Option<MetricsState> {
    init_logging(LoggingConfig::from(&config.logging));

    if !config.metrics.enabled {
        return None;
    }
    match init_metrics() {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(error = %err, "metrics recorder not installed");
            None
        }
    }
}
