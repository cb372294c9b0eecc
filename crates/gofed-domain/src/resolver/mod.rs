//! Batch resolution of keys against a backing source.
//!
//! # Architecture Decisions
//!
//! - **One task per key**: every key in a request, duplicates included, is
//!   resolved by its own tokio task. Tasks are collected with
//!   `FuturesUnordered` and their results written back by position, so the
//!   response order always equals the request order.
//!
//! - **Admission**: a task that misses the cache must hold an
//!   [`AdmissionGate`](crate::gate::AdmissionGate) slot for the whole fetch.
//!   Cache hits never touch the gate.
//!
//! - **Cancellation**: the caller's token (or a child carrying the configured
//!   deadline) only interrupts tasks waiting for a slot. A task that already
//!   holds a slot finishes its fetch, populates the cache and releases.
//!
//! - **Per-key failures**: a backing-source error is attached to that key's
//!   item and never aborts its siblings.

mod batch_resolver;
mod config;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use batch_resolver::BatchResolver;
pub use config::ResolverConfig;
pub use traits::RecordSource;
pub use types::{ResolutionRequest, ResolutionResult, ResolvedItem, ResolverStats};
