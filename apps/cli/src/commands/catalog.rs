//! # Catalog Commands
//!
//! Product list, search and CRUD keyed by `(code, packaging)`.
//!
//! ## Lifecycle
//! ```text
//!   add ──► active ──edit / add-stock / sale──► active
//!              │                                  ▲
//!           delete                             restore
//!              ▼                                  │
//!           deleted ──────────────────────────────┘
//!              │
//!            purge (only without sales)
//!              ▼
//!            gone
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::{refresh_after_write, Refresh};
use crate::error::ApiError;
use crate::state::InventoryCache;
use tally_core::stock::search_products as search_catalog;
use tally_core::validation::{
    normalize_code, require_trimmed, validate_new_product, validate_product_edit, validate_quantity,
    MAX_TEXT_LEN,
};
use tally_core::{Money, Product, ProductDraft, ProductKey, SEARCH_LIMIT};
use tally_db::InventoryStore;

/// Fields an edit may change. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEdit {
    pub code: String,
    pub packaging: String,
    pub name: Option<String>,
    /// `Some("")` clears the type.
    pub product_type: Option<String>,
    pub quantity: Option<i64>,
    pub sourcing_price: Option<Money>,
    pub selling_price: Option<Money>,
}

/// Normalizes an operator-typed key.
fn key(code: &str, packaging: &str) -> Result<ProductKey, ApiError> {
    Ok(ProductKey::new(
        normalize_code(code)?,
        require_trimmed("packaging", packaging, MAX_TEXT_LEN)?,
    ))
}

/// Active products, ordered by code.
pub async fn list_products(cache: &InventoryCache) -> Vec<Product> {
    cache.products().await
}

/// Soft-deleted products, newest deletion first. Empty on a database
/// without soft delete.
pub async fn list_deleted(store: &dyn InventoryStore) -> Result<Vec<Product>, ApiError> {
    Ok(store.list_deleted_products().await?)
}

/// First matches on code, name or packaging.
pub async fn search_products(cache: &InventoryCache, query: &str) -> Vec<Product> {
    let products = cache.products().await;
    search_catalog(&products, query, SEARCH_LIMIT)
        .into_iter()
        .cloned()
        .collect()
}

/// Validates and inserts a new product.
///
/// ## Errors
/// - Validation: empty code/name/packaging/type, negative quantity or price
/// - `UniqueViolation` (as validation): the key already exists, including
///   as a deleted product (restore it instead)
pub async fn add_product(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    draft: ProductDraft,
) -> Result<Product, ApiError> {
    debug!(code = %draft.code, packaging = %draft.packaging, "add_product command");

    let product = validate_new_product(&draft)?;
    store.insert_product(&product).await?;
    info!(key = %product.key(), quantity = product.quantity, "Product added");

    refresh_after_write(store, cache, Refresh::Products).await;
    Ok(product)
}

/// Applies an edit to the current stored row.
///
/// The row is read fresh from the store rather than from the cache.
pub async fn edit_product(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    edit: ProductEdit,
) -> Result<Product, ApiError> {
    let key = key(&edit.code, &edit.packaging)?;
    debug!(key = %key, "edit_product command");

    let mut product = store
        .list_products()
        .await?
        .into_iter()
        .find(|p| p.code == key.code && p.packaging == key.packaging)
        .ok_or_else(|| ApiError::not_found("Product", &key.to_string()))?;

    if let Some(name) = edit.name {
        product.name = name.trim().to_string();
    }
    if let Some(product_type) = edit.product_type {
        let product_type = product_type.trim();
        product.product_type = (!product_type.is_empty()).then(|| product_type.to_string());
    }
    if let Some(quantity) = edit.quantity {
        product.quantity = quantity;
    }
    if let Some(price) = edit.sourcing_price {
        product.sourcing_price_minor = price.minor();
    }
    if let Some(price) = edit.selling_price {
        product.selling_price_minor = price.minor();
    }

    validate_product_edit(&product)?;
    store.update_product(&product).await?;
    info!(key = %key, "Product updated");

    refresh_after_write(store, cache, Refresh::Products).await;
    Ok(product)
}

/// Adds stock atomically on the store side.
///
/// ## Returns
/// The new stock level.
pub async fn add_stock(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    code: &str,
    packaging: &str,
    quantity: i64,
) -> Result<i64, ApiError> {
    validate_quantity(quantity)?;
    let key = key(code, packaging)?;
    debug!(key = %key, quantity = quantity, "add_stock command");

    let level = store.add_stock(&key.code, &key.packaging, quantity).await?;

    refresh_after_write(store, cache, Refresh::Products).await;
    Ok(level)
}

/// Soft-deletes an active product.
pub async fn delete_product(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    code: &str,
    packaging: &str,
) -> Result<(), ApiError> {
    let key = key(code, packaging)?;
    debug!(key = %key, "delete_product command");

    store.soft_delete_product(&key.code, &key.packaging).await?;
    info!(key = %key, "Product moved to deleted");

    refresh_after_write(store, cache, Refresh::Products).await;
    Ok(())
}

/// Restores a soft-deleted product.
pub async fn restore_product(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    code: &str,
    packaging: &str,
) -> Result<(), ApiError> {
    let key = key(code, packaging)?;
    debug!(key = %key, "restore_product command");

    store.restore_product(&key.code, &key.packaging).await?;
    info!(key = %key, "Product restored");

    refresh_after_write(store, cache, Refresh::Products).await;
    Ok(())
}

/// Permanently removes a soft-deleted product with no recorded sales.
pub async fn purge_product(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    code: &str,
    packaging: &str,
) -> Result<(), ApiError> {
    let key = key(code, packaging)?;
    debug!(key = %key, "purge_product command");

    store.hard_delete_product(&key.code, &key.packaging).await?;
    info!(key = %key, "Product purged");

    refresh_after_write(store, cache, Refresh::Products).await;
    Ok(())
}
