//! # Product Type Commands
//!
//! The category lookup list. Products reference types by name, so deleting
//! a type leaves any product carrying that name untouched.

use tracing::{debug, info};

use crate::error::ApiError;
use tally_core::ProductType;
use tally_db::InventoryStore;

/// Types ordered by name.
pub async fn list_types(store: &dyn InventoryStore) -> Result<Vec<ProductType>, ApiError> {
    Ok(store.list_types().await?)
}

/// Adds a type. Blank input is a no-op and returns `None`; duplicate names
/// are rejected by the store.
pub async fn add_type(store: &dyn InventoryStore, name: &str) -> Result<Option<ProductType>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        debug!("add_type ignored blank name");
        return Ok(None);
    }

    let product_type = store.insert_type(name).await?;
    info!(id = %product_type.id, name = %product_type.name, "Product type added");
    Ok(Some(product_type))
}

pub async fn delete_type(store: &dyn InventoryStore, id: &str) -> Result<(), ApiError> {
    store.delete_type(id.trim()).await?;
    info!(id = %id, "Product type deleted");
    Ok(())
}
