//! Adapters exposing the catalog as resolver record sources.
//!
//! Each adapter applies the configured per-fetch latency, standing in for the
//! round trip to a remote backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gofed_domain::error::SourceResult;
use gofed_domain::model::{Product, User};
use gofed_domain::resolver::RecordSource;
use gofed_storage::CatalogStore;

/// Sleeps for `latency`, standing in for a backend round trip.
pub(crate) async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// Product lookups by id.
pub struct ProductSource {
    catalog: Arc<dyn CatalogStore>,
    latency: Duration,
}

impl ProductSource {
    pub fn new(catalog: Arc<dyn CatalogStore>, latency: Duration) -> Self {
        Self { catalog, latency }
    }
}

#[async_trait]
impl RecordSource for ProductSource {
    type Record = Product;

    async fn fetch(&self, key: &str) -> SourceResult<Option<Product>> {
        simulate_latency(self.latency).await;
        Ok(self.catalog.get_product(key).await?)
    }
}

/// User lookups by id.
pub struct UserSource {
    catalog: Arc<dyn CatalogStore>,
    latency: Duration,
}

impl UserSource {
    pub fn new(catalog: Arc<dyn CatalogStore>, latency: Duration) -> Self {
        Self { catalog, latency }
    }
}

#[async_trait]
impl RecordSource for UserSource {
    type Record = User;

    async fn fetch(&self, key: &str) -> SourceResult<Option<User>> {
        simulate_latency(self.latency).await;
        Ok(self.catalog.get_user(key).await?)
    }
}
