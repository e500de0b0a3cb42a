//! # Commands Module
//!
//! Everything the operator can do, independent of how it is invoked.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports, cache refresh)
//! ├── catalog.rs  ◄─── Product list/search/CRUD, stock add, soft delete
//! ├── sale.rs     ◄─── Cart staging, bulk sale recording, receipt
//! ├── report.rs   ◄─── Date-range aggregation, pagination, CSV exports
//! ├── stock.rs    ◄─── Low stock, store value, stock export
//! └── types.rs    ◄─── Product type registry
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the cache
//! async fn low_stock(cache: &InventoryCache)
//!
//! // Only needs the store
//! async fn list_types(store: &dyn InventoryStore)
//!
//! // Writes go to the store, then refresh the cache
//! async fn add_stock(store: &dyn InventoryStore, cache: &InventoryCache, ...)
//! ```

pub mod catalog;
pub mod report;
pub mod sale;
pub mod stock;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use std::path::Path;

use tally_core::CsvTable;
use tally_db::InventoryStore;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::InventoryCache;

/// Which cached collections a successful write invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refresh {
    Products,
    All,
}

/// Refetches the invalidated collections after a committed write.
///
/// The write has committed by now; a failed refresh is not returned. It is
/// logged and the cache is marked stale for the caller to report.
pub(crate) async fn refresh_after_write(store: &dyn InventoryStore, cache: &InventoryCache, what: Refresh) {
    let result = match what {
        Refresh::Products => cache.refresh_products(store).await,
        Refresh::All => cache.refresh(store).await,
    };
    if let Err(e) = result {
        warn!(error = %e, "Cache refresh after write failed");
        cache.mark_stale();
    }
}

/// Shown after a command whose post-write refresh failed.
pub const STALE_CACHE_WARNING: &str =
    "Warning: the change was saved, but the products and sales shown may be out of date. Re-run to refresh.";

/// The warning to print when the cache missed a refresh, if it did.
pub fn stale_cache_warning(cache: &InventoryCache) -> Option<&'static str> {
    cache.is_stale().then_some(STALE_CACHE_WARNING)
}

/// Renders `table` as CSV and writes it to `path`.
///
/// ## Returns
/// Number of data rows written.
pub(crate) fn write_csv(table: &CsvTable, path: &Path) -> Result<usize, ApiError> {
    let csv = table.to_csv()?;
    std::fs::write(path, csv).map_err(|e| {
        ApiError::internal(format!("Could not write {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), rows = table.len(), "CSV exported");
    Ok(table.len())
}
