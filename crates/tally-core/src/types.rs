//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  ProductType    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code     ┐ key │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  packaging┘     │   │  date           │   │  name (unique)  │       │
//! │  │  name, type     │   │  product_code   │   └─────────────────┘       │
//! │  │  quantity       │   │  quantity_sold  │                              │
//! │  │  prices         │   │  price snapshot │   ┌─────────────────┐       │
//! │  │  deleted(_at)   │   └─────────────────┘   │    SaleLine     │       │
//! │  └─────────────────┘                         │  (sale request) │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Products are identified by the pair `(code, packaging)`; the same code
//! may exist in several packagings ("PNT-001" in 1L and 4L tins).
//! `Product.product_type` references a [`ProductType`] by *name*, so deleting
//! a type leaves the string behind on existing products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Upper-cased business code, e.g. `PNT-001`.
    pub code: String,

    /// Packaging variant, e.g. `4L Tin`.
    pub packaging: String,

    /// Display name shown on receipts.
    pub name: String,

    /// Category name (see Type Registry). May dangle after a type delete.
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub product_type: Option<String>,

    /// Units on hand. Never negative after a committed sale.
    pub quantity: i64,

    /// Cost basis in minor units.
    pub sourcing_price_minor: i64,

    /// Shelf price in minor units.
    pub selling_price_minor: i64,

    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    #[inline]
    pub fn key(&self) -> ProductKey {
        ProductKey::new(&self.code, &self.packaging)
    }

    #[inline]
    pub fn sourcing_price(&self) -> Money {
        Money::from_minor(self.sourcing_price_minor)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_minor(self.selling_price_minor)
    }

    /// Value of the units on hand at cost.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.sourcing_price().times(self.quantity)
    }

    /// Whether `quantity` units can be sold from the current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        !self.deleted && self.quantity >= quantity
    }
}

/// The `(code, packaging)` identity of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductKey {
    pub code: String,
    pub packaging: String,
}

impl ProductKey {
    pub fn new(code: impl Into<String>, packaging: impl Into<String>) -> Self {
        ProductKey {
            code: code.into(),
            packaging: packaging.into(),
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.packaging)
    }
}

/// Unvalidated product input from the catalog form.
///
/// Turned into a [`Product`] by [`crate::validation::validate_new_product`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    pub product_type: String,
    pub packaging: String,
    pub quantity: i64,
    pub sourcing_price: Money,
    pub selling_price: Money,
}

// =============================================================================
// Sale
// =============================================================================

/// One recorded sale row (one product line of a checkout).
///
/// ## Snapshot Pattern
/// `name`, `packaging` and both prices are copied from the product when the
/// row is committed. Later catalog edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Assigned by the store at commit.
    pub date: DateTime<Utc>,
    pub product_code: String,
    pub name: String,
    pub packaging: String,
    pub quantity_sold: i64,
    pub selling_price_minor: i64,
    pub sourcing_price_minor: i64,
}

impl Sale {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_minor(self.selling_price_minor)
    }

    #[inline]
    pub fn sourcing_price(&self) -> Money {
        Money::from_minor(self.sourcing_price_minor)
    }

    /// `selling × quantity`.
    #[inline]
    pub fn revenue(&self) -> Money {
        self.selling_price().times(self.quantity_sold)
    }

    /// `selling − sourcing`, using the snapshotted cost.
    #[inline]
    pub fn profit_per_unit(&self) -> Money {
        self.selling_price() - self.sourcing_price()
    }

    #[inline]
    pub fn profit(&self) -> Money {
        self.profit_per_unit().times(self.quantity_sold)
    }
}

/// A request to sell one product; the input of the atomic sale operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_code: String,
    pub packaging: String,
    pub quantity_sold: i64,
    /// Per-line price override; the product's current price when `None`.
    pub selling_price: Option<Money>,
}

impl SaleLine {
    pub fn new(product_code: impl Into<String>, packaging: impl Into<String>, quantity_sold: i64) -> Self {
        SaleLine {
            product_code: product_code.into(),
            packaging: packaging.into(),
            quantity_sold,
            selling_price: None,
        }
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.selling_price = Some(price);
        self
    }

    pub fn key(&self) -> ProductKey {
        ProductKey::new(&self.product_code, &self.packaging)
    }
}

// =============================================================================
// Product Type
// =============================================================================

/// A product category from the Type Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductType {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(qty: i64, sell: i64, cost: i64) -> Sale {
        Sale {
            id: "s1".to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
            product_code: "PNT-001".to_string(),
            name: "Weather Shield".to_string(),
            packaging: "4L".to_string(),
            quantity_sold: qty,
            selling_price_minor: sell,
            sourcing_price_minor: cost,
        }
    }

    #[test]
    fn test_sale_revenue_and_profit() {
        let s = sale(2, 10000, 6000);
        assert_eq!(s.revenue().minor(), 20000);
        assert_eq!(s.profit_per_unit().minor(), 4000);
        assert_eq!(s.profit().minor(), 8000);
    }

    #[test]
    fn test_below_cost_sale_has_negative_profit() {
        let s = sale(3, 500, 700);
        assert_eq!(s.profit().minor(), -600);
    }

    #[test]
    fn test_product_serializes_type_field() {
        let p = Product {
            code: "TIL-010".to_string(),
            packaging: "Box".to_string(),
            name: "Tiles, White".to_string(),
            product_type: Some("Tiles".to_string()),
            quantity: 4,
            sourcing_price_minor: 100,
            selling_price_minor: 150,
            deleted: false,
            deleted_at: None,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "Tiles");
        assert_eq!(json["sellingPriceMinor"], 150);
        assert_eq!(p.stock_value().minor(), 400);
        assert!(p.can_sell(4));
        assert!(!p.can_sell(5));
        assert_eq!(p.key().to_string(), "TIL-010 (Box)");
    }
}
