//! # Stock Commands
//!
//! Low-stock alerts, store value and the catalog export.

use std::path::Path;

use serde::Serialize;

use crate::commands::write_csv;
use crate::error::ApiError;
use crate::state::InventoryCache;
use tally_core::stock::{low_stock as detect_low_stock, search_products, stock_table, store_value as sum_store_value};
use tally_core::{Money, Product, StockLevel};

/// A product under the low-stock threshold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockRow {
    pub level: StockLevel,
    #[serde(flatten)]
    pub product: Product,
}

/// Products with fewer than five units, classified critical (0) or warning.
pub async fn low_stock(cache: &InventoryCache) -> Vec<LowStockRow> {
    let products = cache.products().await;
    detect_low_stock(&products)
        .into_iter()
        .map(|p| LowStockRow {
            level: StockLevel::of(p.quantity),
            product: p.clone(),
        })
        .collect()
}

/// Stock on hand at sourcing cost.
pub async fn store_value(cache: &InventoryCache) -> Money {
    sum_store_value(&cache.products().await)
}

/// Writes the catalog, optionally narrowed by a search query.
///
/// ## Returns
/// Number of product rows written.
pub async fn export_stock(cache: &InventoryCache, path: &Path, query: Option<&str>) -> Result<usize, ApiError> {
    let products = cache.products().await;
    let table = match query {
        Some(q) => stock_table(search_products(&products, q, products.len())),
        None => stock_table(&products),
    };
    write_csv(&table, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fake::{product, FakeStore};

    async fn cache_with(quantities: &[i64]) -> InventoryCache {
        let products = quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| product(&format!("P-{}", i), "Box", q, 100, 150))
            .collect();
        InventoryCache::load(&FakeStore::with_products(products)).await.unwrap()
    }

    #[tokio::test]
    async fn test_low_stock_threshold_and_levels() {
        let cache = cache_with(&[0, 4, 5, 10]).await;

        let rows = low_stock(&cache).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product.code, "P-0");
        assert_eq!(rows[0].level, StockLevel::Critical);
        assert_eq!(rows[1].product.code, "P-1");
        assert_eq!(rows[1].level, StockLevel::Warning);
    }

    #[tokio::test]
    async fn test_store_value_uses_sourcing_price() {
        let cache = cache_with(&[2, 3]).await;
        assert_eq!(store_value(&cache).await, Money::from_minor(500));
    }

    #[tokio::test]
    async fn test_export_stock_with_query() {
        let cache = cache_with(&[1, 2, 3]).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.csv");

        assert_eq!(export_stock(&cache, &path, None).await.unwrap(), 3);
        assert_eq!(export_stock(&cache, &path, Some("p-2")).await.unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Code,Name,Type,Packaging,Qty,Selling Price,Sourcing Price\n\
             P-2,P-2 item,Paint,Box,3,1.50,1.00\n"
        );
    }

    #[test]
    fn test_low_stock_row_json_is_flat() {
        let row = LowStockRow {
            level: StockLevel::Critical,
            product: product("P-0", "Box", 0, 1, 2),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["level"], "critical");
        assert_eq!(json["code"], "P-0");
    }
}
