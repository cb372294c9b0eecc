//! Products and users handlers called by the API layer.

pub mod products;
pub mod users;

pub use products::ProductsHandler;
pub use users::UsersHandler;

use std::future::Future;
use std::time::{Duration, Instant};

use gofed_domain::error::ResolverError;
use gofed_domain::gate::AdmissionGate;
use tokio::time::MissedTickBehavior;

use crate::errors::ServiceError;
use crate::observability::metrics;

/// Maps a batch outcome to its metrics label and records it.
fn record_batch_outcome<T>(
    service: &str,
    keys: usize,
    started: Instant,
    result: &Result<T, ServiceError>,
) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(ServiceError::Resolver(ResolverError::Cancelled)) => "cancelled",
        Err(ServiceError::Resolver(ResolverError::Timeout { .. })) => "timeout",
        Err(_) => "error",
    };
    metrics::record_batch(service, keys, started.elapsed(), outcome);
    if let Err(err) = result {
        metrics::record_error(service, err.kind());
    }
}

/// How often gate occupancy is published while a batch is in flight.
const GATE_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Drives `work` to completion, publishing gate gauges on every tick.
///
/// A final sample is taken once `work` finishes, so the gauges settle on the
/// post-batch occupancy.
async fn sample_gate_while<F: Future>(service: &str, gate: &AdmissionGate, work: F) -> F::Output {
    tokio::pin!(work);
    let mut ticks = tokio::time::interval(GATE_SAMPLE_INTERVAL);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let output = loop {
        tokio::select! {
            biased;

            output = &mut work => break output,
            _ = ticks.tick() => metrics::record_gate_stats(service, &gate.stats()),
        }
    };
    metrics::record_gate_stats(service, &gate.stats());
    output
}
