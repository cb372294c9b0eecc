//! Catalog storage trait definitions.

use async_trait::async_trait;
use gofed_domain::model::{Product, User};

use crate::error::{StorageError, StorageResult};

/// Maximum length for record identifiers.
pub const MAX_ID_LENGTH: usize = 64;

/// Validates a record identifier.
pub fn validate_id(id: &str) -> StorageResult<()> {
    if id.is_empty() {
        return Err(StorageError::InvalidInput {
            message: "id cannot be empty".to_string(),
        });
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(StorageError::InvalidInput {
            message: format!("id exceeds {MAX_ID_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Read/write access to the product and user catalogs.
///
/// Lookups of unknown ids return `Ok(None)`, not an error.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Gets a product by id.
    async fn get_product(&self, id: &str) -> StorageResult<Option<Product>>;

    /// Lists every product, ordered by id.
    async fn list_products(&self) -> StorageResult<Vec<Product>>;

    /// Lists products in `category` (case-insensitive), ordered by id.
    async fn products_by_category(&self, category: &str) -> StorageResult<Vec<Product>>;

    /// Inserts a product. Fails if the id is already taken.
    async fn insert_product(&self, product: Product) -> StorageResult<()>;

    /// Gets a user by id.
    async fn get_user(&self, id: &str) -> StorageResult<Option<User>>;

    /// Lists every user, ordered by id.
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// Inserts a user. Fails if the id is already taken.
    async fn insert_user(&self, user: User) -> StorageResult<()>;
}
