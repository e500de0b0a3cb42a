//! # Inventory Cache
//!
//! The product and sales lists every read-side command works from.
//!
//! ## Refresh Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutation succeeds ──► refresh_*() ──► refetch the whole collection    │
//! │                                                                         │
//! │  No delta updates: a refresh always reflects every write this process  │
//! │  has made, so reads never see data older than the last local write.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A refresh that fails after a committed write marks the cache stale until
//! the next full refresh succeeds, so the caller can warn the operator.
//!
//! ## Thread Safety
//! Both collections sit behind `tokio::sync::RwLock`; readers get clones.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use tally_core::{Product, Sale};
use tally_db::{DbResult, InventoryStore};

#[derive(Debug, Default)]
pub struct InventoryCache {
    products: RwLock<Vec<Product>>,
    sales: RwLock<Vec<Sale>>,
    stale: AtomicBool,
}

impl InventoryCache {
    pub fn new() -> Self {
        InventoryCache::default()
    }

    /// Loads both collections from the store.
    pub async fn load(store: &dyn InventoryStore) -> DbResult<Self> {
        let cache = InventoryCache::new();
        cache.refresh(store).await?;
        Ok(cache)
    }

    /// Refetches products and sales. Clears the stale mark on success.
    pub async fn refresh(&self, store: &dyn InventoryStore) -> DbResult<()> {
        self.refresh_products(store).await?;
        self.refresh_sales(store).await?;
        self.stale.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub async fn refresh_products(&self, store: &dyn InventoryStore) -> DbResult<()> {
        let products = store.list_products().await?;
        debug!(count = products.len(), "Product cache refreshed");
        *self.products.write().await = products;
        Ok(())
    }

    pub async fn refresh_sales(&self, store: &dyn InventoryStore) -> DbResult<()> {
        let sales = store.list_sales().await?;
        debug!(count = sales.len(), "Sales cache refreshed");
        *self.sales.write().await = sales;
        Ok(())
    }

    /// Flags the cached lists as possibly behind the store.
    pub fn mark_stale(&self) {
        self.stale.store(true, Ordering::Relaxed);
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Relaxed)
    }

    /// Active products ordered by code.
    pub async fn products(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    /// Sales, newest first.
    pub async fn sales(&self) -> Vec<Sale> {
        self.sales.read().await.clone()
    }

    /// Finds an active product by its key. `code` is matched case-insensitively.
    pub async fn find_product(&self, code: &str, packaging: &str) -> Option<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code.trim()) && p.packaging == packaging.trim())
            .cloned()
    }
}
