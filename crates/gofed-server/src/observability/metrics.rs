//! Prometheus metrics infrastructure.
//!
//! This module provides Prometheus-compatible metrics using the `metrics` crate
//! with `metrics-exporter-prometheus` for exposition.
//!
//! # Metrics Exposed
//!
//! - `gofed_gate_in_use` - Slots currently held, by service
//! - `gofed_gate_capacity` - Configured gate capacity, by service
//! - `gofed_gate_waiting` - Units queued for a slot, by service
//! - `gofed_cache_size` - Cached records, by service
//! - `gofed_cache_capacity` - Configured cache capacity, by service
//! - `gofed_batch_requests_total` - Batch calls by service and outcome
//! - `gofed_batch_duration_seconds` - Batch call duration histogram
//! - `gofed_batch_keys_total` - Keys requested across all batches
//! - `gofed_errors_total` - Handler errors by service and kind

use std::sync::Arc;
use std::time::Duration;

use gofed_domain::cache::CacheStats;
use gofed_domain::gate::GateStats;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Shared state containing the Prometheus handle for metrics rendering.
#[derive(Clone)]
pub struct MetricsState {
    handle: Arc<PrometheusHandle>,
}

impl MetricsState {
    /// Creates a new metrics state with the given Prometheus handle.
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Renders the current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsState").finish_non_exhaustive()
    }
}

/// Error type for metrics initialization.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: recorder already installed")]
    AlreadyInstalled,
}

/// Installs the global Prometheus recorder.
///
/// Must be called once at startup, before any metrics are recorded.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn init_metrics() -> Result<MetricsState, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|_| MetricsError::AlreadyInstalled)?;

    register_default_metrics();

    Ok(MetricsState::new(handle))
}

fn register_default_metrics() {
    metrics::describe_gauge!("gofed_gate_in_use", "Admission gate slots currently held");
    metrics::describe_gauge!("gofed_gate_capacity", "Admission gate capacity");
    metrics::describe_gauge!(
        "gofed_gate_waiting",
        "Work units waiting for an admission gate slot"
    );

    metrics::describe_gauge!("gofed_cache_size", "Number of cached records");
    metrics::describe_gauge!("gofed_cache_capacity", "Record cache capacity");

    metrics::describe_counter!(
        "gofed_batch_requests_total",
        "Total number of batch resolution calls"
    );
    metrics::describe_histogram!(
        "gofed_batch_duration_seconds",
        "Batch resolution duration in seconds"
    );
    metrics::describe_counter!(
        "gofed_batch_keys_total",
        "Total number of keys requested across batch calls"
    );

    metrics::describe_counter!("gofed_errors_total", "Total number of handler errors");
}

/// Publishes a gate snapshot as gauges.
pub fn record_gate_stats(service: &str, stats: &GateStats) {
    let labels = [("service", service.to_string())];

    metrics::gauge!("gofed_gate_in_use", &labels).set(stats.in_use as f64);
    metrics::gauge!("gofed_gate_capacity", &labels).set(stats.capacity as f64);
    metrics::gauge!("gofed_gate_waiting", &labels).set(stats.waiting as f64);
}

/// Publishes a cache snapshot as gauges.
pub fn record_cache_stats(service: &str, stats: &CacheStats) {
    let labels = [("service", service.to_string())];

    metrics::gauge!("gofed_cache_size", &labels).set(stats.size as f64);
    metrics::gauge!("gofed_cache_capacity", &labels).set(stats.capacity as f64);
}

/// Records one batch call.
///
/// # Arguments
///
/// * `service` - Service that handled the batch
/// * `keys` - Number of keys requested
/// * `elapsed` - Wall time of the call
/// * `outcome` - `"ok"`, `"cancelled"`, `"timeout"` or `"error"`
pub fn record_batch(service: &str, keys: usize, elapsed: Duration, outcome: &str) {
    let labels = [
        ("service", service.to_string()),
        ("outcome", outcome.to_string()),
    ];

    metrics::counter!("gofed_batch_requests_total", &labels).increment(1);
    metrics::histogram!("gofed_batch_duration_seconds", &labels).record(elapsed.as_secs_f64());
    metrics::counter!("gofed_batch_keys_total", "service" => service.to_string())
        .increment(keys as u64);
}

/// Counts a handler error.
pub fn record_error(service: &str, kind: &str) {
    let labels = [("service", service.to_string()), ("kind", kind.to_string())];

    metrics::counter!("gofed_errors_total", &labels).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recorders are scoped with `with_local_recorder`, so these tests never
    // touch the process-wide recorder.

    fn render_with<F: FnOnce()>(record: F) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, record);
        handle.render()
    }

    #[test]
    fn test_metrics_state_render_returns_string() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = MetricsState::new(handle);

        let cloned = state.clone();
        assert_eq!(state.render(), cloned.render());
    }

    #[test]
    fn test_gate_stats_become_labelled_gauges() {
        let stats = GateStats {
            capacity: 3,
            in_use: 2,
            available: 1,
            utilization_percent: 200.0 / 3.0,
            waiting: 4,
        };

        let output = render_with(|| record_gate_stats("products", &stats));

        assert!(output.contains("gofed_gate_in_use{service=\"products\"} 2"));
        assert!(output.contains("gofed_gate_capacity{service=\"products\"} 3"));
        assert!(output.contains("gofed_gate_waiting{service=\"products\"} 4"));
    }

    #[test]
    fn test_batch_and_error_counters() {
        let output = render_with(|| {
            record_batch("users", 5, Duration::from_millis(120), "ok");
            record_batch("users", 2, Duration::from_millis(80), "ok");
            record_error("users", "timeout");
        });

        assert!(output.contains("gofed_batch_requests_total{service=\"users\",outcome=\"ok\"} 2"));
        assert!(output.contains("gofed_batch_keys_total{service=\"users\"} 7"));
        assert!(output.contains("gofed_errors_total{service=\"users\",kind=\"timeout\"} 1"));
        assert!(output.contains("gofed_batch_duration_seconds"));
    }
}
