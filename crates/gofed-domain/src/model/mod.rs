//! Records served by the products and users services.

mod types;

pub use types::{Product, User};
