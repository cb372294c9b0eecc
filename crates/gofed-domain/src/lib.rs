//! gofed-domain: bounded-concurrency batch resolution
//!
//! This crate contains the concurrency-control core shared by the products
//! and users services:
//! - Admission gate bounding in-flight work
//! - Capacity-bounded record cache
//! - Batch resolver fanning keys out under the gate
//! - Record types served by the services
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                gofed-domain                 │
//! ├─────────────────────────────────────────────┤
//! │  gate/      - Admission gate (slots)        │
//! │  cache/     - Bounded record cache          │
//! │  resolver/  - Batch fan-out / fan-in        │
//! │  model/     - Product and user records      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod gate;
pub mod model;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use cache::{BoundedCache, BoundedCacheConfig, CacheStats};
pub use error::{CacheError, GateError, ResolverError, ResolverResult, SourceError, SourceResult};
pub use gate::{AdmissionGate, GatePermit, GateStats};
pub use model::{Product, User};
pub use resolver::{
    BatchResolver, RecordSource, ResolutionRequest, ResolutionResult, ResolvedItem,
    ResolverConfig, ResolverStats,
};
