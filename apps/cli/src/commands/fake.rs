//! In-memory [`InventoryStore`] for command tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tally_core::{Product, ProductKey, ProductType, Sale, SaleLine};
use tally_db::{DbError, DbResult, InventoryStore, SchemaCapabilities};

/// How the fake fails a `record_sale` for one product code.
#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    SchemaMismatch,
    Backend,
}

#[derive(Debug, Default)]
struct FakeState {
    products: Vec<Product>,
    sales: Vec<Sale>,
    types: Vec<ProductType>,
    record_calls: usize,
    list_calls: usize,
    fail_code: Option<(String, FakeFailure)>,
    fail_lists: bool,
    sale_time: Option<DateTime<Utc>>,
    next_id: u64,
}

#[derive(Debug)]
pub struct FakeStore {
    caps: SchemaCapabilities,
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new() -> Self {
        FakeStore {
            caps: SchemaCapabilities::latest(),
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn legacy() -> Self {
        FakeStore {
            caps: SchemaCapabilities::for_version(1),
            ..FakeStore::new()
        }
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let store = FakeStore::new();
        store.state.lock().unwrap().products = products;
        store
    }

    pub fn fail_sales_of(&self, code: &str, failure: FakeFailure) {
        self.state.lock().unwrap().fail_code = Some((code.to_string(), failure));
    }

    /// Makes `list_products` and `list_sales` fail from now on.
    pub fn fail_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    /// Stamps every later sale with `at` instead of the wall clock.
    pub fn stamp_sales_at(&self, at: DateTime<Utc>) {
        self.state.lock().unwrap().sale_time = Some(at);
    }

    pub fn record_calls(&self) -> usize {
        self.state.lock().unwrap().record_calls
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn product(&self, code: &str, packaging: &str) -> Option<Product> {
        self.state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.code == code && p.packaging == packaging)
            .cloned()
    }

    fn next_id(state: &mut FakeState) -> String {
        state.next_id += 1;
        format!("fake-{}", state.next_id)
    }
}

pub fn product(code: &str, packaging: &str, quantity: i64, sourcing: i64, selling: i64) -> Product {
    Product {
        code: code.to_string(),
        packaging: packaging.to_string(),
        name: format!("{} item", code),
        product_type: Some("Paint".to_string()),
        quantity,
        sourcing_price_minor: sourcing,
        selling_price_minor: selling,
        deleted: false,
        deleted_at: None,
    }
}

fn not_found(code: &str, packaging: &str) -> DbError {
    DbError::not_found("Product", ProductKey::new(code, packaging).to_string())
}

#[async_trait]
impl InventoryStore for FakeStore {
    fn capabilities(&self) -> SchemaCapabilities {
        self.caps
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.fail_lists {
            return Err(DbError::QueryFailed("disk I/O error".to_string()));
        }
        let mut products: Vec<Product> = state.products.iter().filter(|p| !p.deleted).cloned().collect();
        products.sort_by(|a, b| (&a.code, &a.packaging).cmp(&(&b.code, &b.packaging)));
        Ok(products)
    }

    async fn list_deleted_products(&self) -> DbResult<Vec<Product>> {
        if !self.caps.soft_delete {
            return Ok(Vec::new());
        }
        let state = self.state.lock().unwrap();
        let mut deleted: Vec<Product> = state.products.iter().filter(|p| p.deleted).cloned().collect();
        deleted.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(deleted)
    }

    async fn list_sales(&self) -> DbResult<Vec<Sale>> {
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(DbError::QueryFailed("disk I/O error".to_string()));
        }
        Ok(state.sales.iter().rev().cloned().collect())
    }

    async fn insert_product(&self, product: &Product) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        if state
            .products
            .iter()
            .any(|p| p.code == product.code && p.packaging == product.packaging)
        {
            return Err(DbError::duplicate("product", product.key().to_string()));
        }
        state.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .products
            .iter_mut()
            .find(|p| p.code == product.code && p.packaging == product.packaging && !p.deleted)
            .ok_or_else(|| not_found(&product.code, &product.packaging))?;
        *existing = Product {
            deleted: false,
            deleted_at: None,
            ..product.clone()
        };
        Ok(())
    }

    async fn add_stock(&self, code: &str, packaging: &str, quantity: i64) -> DbResult<i64> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .products
            .iter_mut()
            .find(|p| p.code == code && p.packaging == packaging && !p.deleted)
            .ok_or_else(|| not_found(code, packaging))?;
        existing.quantity += quantity;
        Ok(existing.quantity)
    }

    async fn soft_delete_product(&self, code: &str, packaging: &str) -> DbResult<()> {
        if !self.caps.soft_delete {
            return Err(DbError::schema_mismatch("products.deleted column is missing"));
        }
        let mut state = self.state.lock().unwrap();
        let existing = state
            .products
            .iter_mut()
            .find(|p| p.code == code && p.packaging == packaging && !p.deleted)
            .ok_or_else(|| not_found(code, packaging))?;
        existing.deleted = true;
        existing.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn restore_product(&self, code: &str, packaging: &str) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .products
            .iter_mut()
            .find(|p| p.code == code && p.packaging == packaging && p.deleted)
            .ok_or_else(|| not_found(code, packaging))?;
        existing.deleted = false;
        existing.deleted_at = None;
        Ok(())
    }

    async fn hard_delete_product(&self, code: &str, packaging: &str) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.products.len();
        state
            .products
            .retain(|p| !(p.code == code && p.packaging == packaging && p.deleted));
        if state.products.len() == before {
            return Err(not_found(code, packaging));
        }
        Ok(())
    }

    async fn record_sale(&self, line: &SaleLine) -> DbResult<Sale> {
        let mut state = self.state.lock().unwrap();
        state.record_calls += 1;

        if let Some((code, failure)) = state.fail_code.clone() {
            if code == line.product_code {
                return Err(match failure {
                    FakeFailure::SchemaMismatch => {
                        DbError::schema_mismatch("table sales has no column named selling_price_minor")
                    }
                    FakeFailure::Backend => DbError::QueryFailed("database is locked".to_string()),
                });
            }
        }

        let id = FakeStore::next_id(&mut state);
        let date = state.sale_time.unwrap_or_else(Utc::now);
        let product = state
            .products
            .iter_mut()
            .find(|p| p.code == line.product_code && p.packaging == line.packaging && !p.deleted)
            .ok_or_else(|| not_found(&line.product_code, &line.packaging))?;

        if product.quantity < line.quantity_sold {
            return Err(DbError::InsufficientStock {
                code: product.code.clone(),
                packaging: product.packaging.clone(),
                available: product.quantity,
                requested: line.quantity_sold,
            });
        }
        product.quantity -= line.quantity_sold;

        let sale = Sale {
            id,
            date,
            product_code: product.code.clone(),
            name: product.name.clone(),
            packaging: product.packaging.clone(),
            quantity_sold: line.quantity_sold,
            selling_price_minor: line
                .selling_price
                .map(|p| p.minor())
                .unwrap_or(product.selling_price_minor),
            sourcing_price_minor: product.sourcing_price_minor,
        };
        state.sales.push(sale.clone());
        Ok(sale)
    }

    async fn list_types(&self) -> DbResult<Vec<ProductType>> {
        let mut types = self.state.lock().unwrap().types.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn insert_type(&self, name: &str) -> DbResult<ProductType> {
        let mut state = self.state.lock().unwrap();
        if state.types.iter().any(|t| t.name == name) {
            return Err(DbError::duplicate("type name", name));
        }
        let product_type = ProductType {
            id: FakeStore::next_id(&mut state),
            name: name.to_string(),
        };
        state.types.push(product_type.clone());
        Ok(product_type)
    }

    async fn delete_type(&self, id: &str) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.types.len();
        state.types.retain(|t| t.id != id);
        if state.types.len() == before {
            return Err(DbError::not_found("Product type", id));
        }
        Ok(())
    }
}
