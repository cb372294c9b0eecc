//! Products handler: gate-limited batch lookups over the product catalog.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gofed_domain::gate::{AdmissionGate, GateStats};
use gofed_domain::model::Product;
use gofed_domain::resolver::{BatchResolver, ResolutionRequest, ResolverConfig};
use gofed_storage::CatalogStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::{record_batch_outcome, sample_gate_while};
use crate::adapters::{simulate_latency, ProductSource};
use crate::errors::{ServiceError, ServiceResult};
use crate::observability::metrics;

/// Serves product queries.
///
/// Batch lookups fan out one fetch per id, at most `gate.capacity()` at a
/// time. Products are not cached, so every id in every batch costs a fetch.
pub struct ProductsHandler {
    service: String,
    catalog: Arc<dyn CatalogStore>,
    latency: Duration,
    resolver: BatchResolver<ProductSource>,
}

impl ProductsHandler {
    pub fn new(
        service: impl Into<String>,
        catalog: Arc<dyn CatalogStore>,
        gate: Arc<AdmissionGate>,
        latency: Duration,
        config: ResolverConfig,
    ) -> Self {
        let source = Arc::new(ProductSource::new(Arc::clone(&catalog), latency));
        Self {
            service: service.into(),
            catalog,
            latency,
            resolver: BatchResolver::new(source, gate).with_config(config),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Resolves `ids` under the admission gate.
    ///
    /// Returns the products found, in request order. Unknown ids and ids
    /// whose fetch failed are left out.
    #[instrument(skip(self, cancel, ids), fields(service = %self.service, batch_size = ids.len()))]
    pub async fn products_by_ids(
        &self,
        cancel: &CancellationToken,
        ids: &[String],
    ) -> ServiceResult<Vec<Product>> {
        let started = Instant::now();
        let request = ResolutionRequest::new(ids.iter().cloned());

        let resolving = self.resolver.resolve_batch(cancel, request);
        let result = sample_gate_while(&self.service, self.resolver.gate(), resolving)
            .await
            .map_err(ServiceError::from)
            .map(|resolution| {
                let failures = resolution.error_count();
                if failures > 0 {
                    warn!(failures, "some product fetches failed");
                }
                resolution.into_records()
            });

        record_batch_outcome(&self.service, ids.len(), started, &result);

        if let Ok(products) = &result {
            info!(
                found = products.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "resolved products"
            );
        }
        result
    }

    /// Returns every product in `category`, ignoring case.
    #[instrument(skip(self), fields(service = %self.service))]
    pub async fn products_by_category(&self, category: &str) -> ServiceResult<Vec<Product>> {
        let products = self.catalog.products_by_category(category).await?;
        info!(found = products.len(), "listed products by category");
        Ok(products)
    }

    /// Returns one product by id.
    ///
    /// Single lookups pay the same simulated fetch latency as batch units but
    /// do not take a gate slot.
    pub async fn product(&self, id: &str) -> ServiceResult<Option<Product>> {
        simulate_latency(self.latency).await;
        Ok(self.catalog.get_product(id).await?)
    }

    /// Returns every product.
    pub async fn products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.catalog.list_products().await?)
    }

    /// Returns the current gate occupancy and publishes it as gauges.
    pub fn gate_stats(&self) -> GateStats {
        let stats = self.resolver.gate().stats();
        metrics::record_gate_stats(&self.service, &stats);
        stats
    }
}
