//! gofed-server: Service layer for the products and users backends
//!
//! This crate wires the domain core to the catalog and exposes the handlers
//! the API layer calls:
//! - Products handler with gate-limited batch lookups
//! - Users handler with cached batch lookups
//! - Configuration management
//! - Structured logging and Prometheus metrics
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               gofed-server                  │
//! ├─────────────────────────────────────────────┤
//! │  config.rs      - Configuration management  │
//! │  adapters.rs    - Catalog record sources    │
//! │  handlers/      - Request handlers          │
//! │    products.rs  - Product queries           │
//! │    users.rs     - User queries              │
//! │  service.rs     - Wiring from config        │
//! │  observability/ - Logging and metrics       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod observability;
pub mod service;

// Re-exports for convenience
pub use config::{ConfigLoadError, ServiceConfig};
pub use errors::{ServiceError, ServiceResult};
pub use handlers::{ProductsHandler, UsersHandler};
pub use service::{init_observability, Services};
