//! Shared test utilities for the gofed service tests.

// Each test file compiles this module separately and uses a different subset.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use gofed_domain::cache::{BoundedCache, BoundedCacheConfig};
use gofed_domain::gate::AdmissionGate;
use gofed_domain::resolver::ResolverConfig;
use gofed_server::{ProductsHandler, UsersHandler};
use gofed_storage::MemoryCatalog;

/// Simulated product fetch latency.
pub const PRODUCT_LATENCY: Duration = Duration::from_millis(200);

/// Number of concurrent callers for stress tests.
pub const CONCURRENT_CALLERS: usize = 50;

pub fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn products_handler(capacity: usize, latency: Duration) -> ProductsHandler {
    ProductsHandler::new(
        "products",
        MemoryCatalog::seeded_shared(),
        Arc::new(AdmissionGate::new(capacity).unwrap()),
        latency,
        ResolverConfig::default(),
    )
}

pub fn users_handler(
    gate_capacity: usize,
    cache_capacity: usize,
    latency: Duration,
    config: ResolverConfig,
) -> UsersHandler {
    UsersHandler::new(
        "users",
        MemoryCatalog::seeded_shared(),
        Arc::new(AdmissionGate::new(gate_capacity).unwrap()),
        Arc::new(BoundedCache::new(BoundedCacheConfig::new(cache_capacity)).unwrap()),
        latency,
        config,
    )
}
