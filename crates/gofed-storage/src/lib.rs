//! gofed-storage: Catalog storage layer
//!
//! This crate provides the product and user catalogs the services read from:
//! - CatalogStore trait for catalog operations
//! - In-memory implementation backed by DashMap
//! - Seed dataset used by the services and tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               gofed-storage                 │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs  - CatalogStore trait            │
//! │  memory.rs  - In-memory implementation      │
//! │  seed.rs    - Seed products and users       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod seed;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryCatalog;
pub use traits::CatalogStore;
