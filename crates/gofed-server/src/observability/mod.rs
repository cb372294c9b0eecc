//! Observability infrastructure for the gofed services.
//!
//! This module provides:
//! - Structured logging configuration
//! - Prometheus metrics for gate, cache and batch activity

pub mod logging;
pub mod metrics;

pub use logging::{create_json_layer, init_logging, LoggingConfig};
pub use metrics::{init_metrics, MetricsError, MetricsState};
