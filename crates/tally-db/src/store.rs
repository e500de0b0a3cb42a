//! # Inventory Store Contract
//!
//! Every call the application makes to the data store goes through
//! [`InventoryStore`]. [`Database`] is the SQLite implementation; tests in the
//! application crate substitute an in-memory one.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reads                                                                  │
//! │    list_products()          active, ordered by code                    │
//! │    list_deleted_products()  newest deletion first; [] without support  │
//! │    list_sales()             newest first                               │
//! │    list_types()             ordered by name                            │
//! │                                                                         │
//! │  Writes                                                                 │
//! │    insert_product / update_product                                     │
//! │    add_stock                atomic increment                           │
//! │    soft_delete / restore / hard_delete                                 │
//! │    record_sale              atomic check + decrement + snapshot insert │
//! │    insert_type / delete_type                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::DbResult;
use crate::migrations::SchemaCapabilities;
use crate::pool::Database;
use tally_core::{Product, ProductType, Sale, SaleLine};

/// The data-store contract.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    fn capabilities(&self) -> SchemaCapabilities;

    async fn list_products(&self) -> DbResult<Vec<Product>>;

    async fn list_deleted_products(&self) -> DbResult<Vec<Product>>;

    async fn list_sales(&self) -> DbResult<Vec<Sale>>;

    async fn insert_product(&self, product: &Product) -> DbResult<()>;

    /// Keyed by `(code, packaging)`; the key itself cannot change.
    async fn update_product(&self, product: &Product) -> DbResult<()>;

    /// Returns the new stock level.
    async fn add_stock(&self, code: &str, packaging: &str, quantity: i64) -> DbResult<i64>;

    async fn soft_delete_product(&self, code: &str, packaging: &str) -> DbResult<()>;

    async fn restore_product(&self, code: &str, packaging: &str) -> DbResult<()>;

    async fn hard_delete_product(&self, code: &str, packaging: &str) -> DbResult<()>;

    async fn record_sale(&self, line: &SaleLine) -> DbResult<Sale>;

    async fn list_types(&self) -> DbResult<Vec<ProductType>>;

    async fn insert_type(&self, name: &str) -> DbResult<ProductType>;

    async fn delete_type(&self, id: &str) -> DbResult<()>;
}

#[async_trait]
impl InventoryStore for Database {
    fn capabilities(&self) -> SchemaCapabilities {
        Database::capabilities(self)
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.products().list().await
    }

    async fn list_deleted_products(&self) -> DbResult<Vec<Product>> {
        self.products().list_deleted().await
    }

    async fn list_sales(&self) -> DbResult<Vec<Sale>> {
        self.sales().list().await
    }

    async fn insert_product(&self, product: &Product) -> DbResult<()> {
        self.products().insert(product).await
    }

    async fn update_product(&self, product: &Product) -> DbResult<()> {
        self.products().update(product).await
    }

    async fn add_stock(&self, code: &str, packaging: &str, quantity: i64) -> DbResult<i64> {
        self.products().add_stock(code, packaging, quantity).await
    }

    async fn soft_delete_product(&self, code: &str, packaging: &str) -> DbResult<()> {
        self.products().soft_delete(code, packaging).await
    }

    async fn restore_product(&self, code: &str, packaging: &str) -> DbResult<()> {
        self.products().restore(code, packaging).await
    }

    async fn hard_delete_product(&self, code: &str, packaging: &str) -> DbResult<()> {
        self.products().hard_delete(code, packaging).await
    }

    async fn record_sale(&self, line: &SaleLine) -> DbResult<Sale> {
        self.sales().record(line).await
    }

    async fn list_types(&self) -> DbResult<Vec<ProductType>> {
        self.product_types().list().await
    }

    async fn insert_type(&self, name: &str) -> DbResult<ProductType> {
        self.product_types().insert(name).await
    }

    async fn delete_type(&self, id: &str) -> DbResult<()> {
        self.product_types().delete(id).await
    }
}
