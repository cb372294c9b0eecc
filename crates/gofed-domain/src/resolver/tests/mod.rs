//! Tests for the batch resolver.
//!
//! Organized by functionality:
//! - Validation and ordering
//! - Per-key outcomes (missing records, source failures, panics)
//! - Backpressure through the admission gate
//! - Cancellation and deadlines
//! - Cache interaction
