//! # Stock
//!
//! Low-stock detection, stock value and catalog search over the loaded
//! product list.

use serde::{Deserialize, Serialize};

use crate::export::CsvTable;
use crate::money::Money;
use crate::types::Product;
use crate::LOW_STOCK_THRESHOLD;

/// Presentation class of a product's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Nothing on hand.
    Critical,
    /// Below [`LOW_STOCK_THRESHOLD`].
    Warning,
    Healthy,
}

impl StockLevel {
    pub fn of(quantity: i64) -> Self {
        if quantity <= 0 {
            StockLevel::Critical
        } else if quantity < LOW_STOCK_THRESHOLD {
            StockLevel::Warning
        } else {
            StockLevel::Healthy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::Critical => "critical",
            StockLevel::Warning => "warning",
            StockLevel::Healthy => "ok",
        }
    }
}

/// Products with `quantity < 5`, in input order.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.quantity < LOW_STOCK_THRESHOLD)
        .collect()
}

/// `Σ quantity × sourcing price`.
pub fn store_value(products: &[Product]) -> Money {
    products.iter().map(Product::stock_value).sum()
}

/// Case-insensitive substring match on code, name or packaging; at most
/// `limit` results. An empty query matches everything.
pub fn search_products<'a>(products: &'a [Product], query: &str, limit: usize) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.code.to_lowercase().contains(&needle)
                || p.name.to_lowercase().contains(&needle)
                || p.packaging.to_lowercase().contains(&needle)
        })
        .take(limit)
        .collect()
}

/// Catalog export: code, name, type, packaging, quantity and both prices.
pub fn stock_table<'a, I>(products: I) -> CsvTable
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut table = CsvTable::new([
        "Code",
        "Name",
        "Type",
        "Packaging",
        "Qty",
        "Selling Price",
        "Sourcing Price",
    ]);
    for p in products {
        table.push_row(vec![
            p.code.clone(),
            p.name.clone(),
            p.product_type.clone().unwrap_or_default(),
            p.packaging.clone(),
            p.quantity.to_string(),
            p.selling_price().to_string(),
            p.sourcing_price().to_string(),
        ]);
    }
    table
}
