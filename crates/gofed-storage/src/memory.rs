//! In-memory catalog implementation.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gofed_domain::model::{Product, User};
use tracing::{debug, instrument};

use crate::error::{StorageError, StorageResult};
use crate::seed;
use crate::traits::{validate_id, CatalogStore};

/// In-memory implementation of CatalogStore.
///
/// Uses DashMap for thread-safe concurrent access. Listings are sorted by id
/// on the way out, numerically when both ids are numbers.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: DashMap<String, Product>,
    users: DashMap<String, User>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the seed products and users.
    pub fn seeded() -> Self {
        let catalog = Self::new();
        for user in seed::users() {
            catalog.users.insert(user.id.clone(), user);
        }
        for product in seed::products() {
            catalog.products.insert(product.id.clone(), product);
        }
        debug!(
            products = catalog.products.len(),
            users = catalog.users.len(),
            "seeded memory catalog"
        );
        catalog
    }

    /// Creates a seeded catalog wrapped in Arc.
    pub fn seeded_shared() -> Arc<Self> {
        Arc::new(Self::seeded())
    }
}

/// Orders ids numerically when both parse, lexically otherwise.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn sorted_values<V: Clone>(map: &DashMap<String, V>, id: impl Fn(&V) -> &str) -> Vec<V> {
    let mut values: Vec<V> = map.iter().map(|entry| entry.value().clone()).collect();
    values.sort_by(|a, b| compare_ids(id(a), id(b)));
    values
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn get_product(&self, id: &str) -> StorageResult<Option<Product>> {
        validate_id(id)?;
        Ok(self.products.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_products(&self) -> StorageResult<Vec<Product>> {
        Ok(sorted_values(&self.products, |p| p.id.as_str()))
    }

    #[instrument(skip(self))]
    async fn products_by_category(&self, category: &str) -> StorageResult<Vec<Product>> {
        let mut products = sorted_values(&self.products, |p| p.id.as_str());
        products.retain(|product| product.in_category(category));
        Ok(products)
    }

    async fn insert_product(&self, product: Product) -> StorageResult<()> {
        validate_id(&product.id)?;
        match self.products.entry(product.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateRecord {
                kind: "product",
                id: product.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(product);
                Ok(())
            }
        }
    }

    async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        validate_id(id)?;
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(sorted_values(&self.users, |u| u.id.as_str()))
    }

    async fn insert_user(&self, user: User) -> StorageResult<()> {
        validate_id(&user.id)?;
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateRecord {
                kind: "user",
                id: user.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }
}
