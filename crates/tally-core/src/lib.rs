//! # tally-core: Pure Business Logic for Tally
//!
//! Everything Tally decides without talking to the data store: money
//! arithmetic, validation, cart staging, report aggregation, low-stock
//! detection, receipts and CSV tables.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally CLI (apps/cli)                         │   │
//! │  │    products ─ types ─ sell ─ report ─ stock                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ report  │ │  stock  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   ┌────────────┐ ┌─────────┐ ┌─────────┐                       │   │
//! │  │   │ validation │ │ receipt │ │ export  │                       │   │
//! │  │   └────────────┘ └─────────┘ └─────────┘                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Data Store)                        │   │
//! │  │     SQLite, migrations, atomic sale / stock operations          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Sale, ProductType, SaleLine
//! - [`money`] - Integer minor-unit money
//! - [`error`] - Domain error types
//! - [`validation`] - Catalog and sale input rules
//! - [`cart`] - Sale staging
//! - [`report`] - Date ranges, totals, top sellers, pagination
//! - [`stock`] - Low stock, store value, search
//! - [`receipt`] - Thermal receipt text
//! - [`export`] - CSV tables
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Cart, Money, Product};
//!
//! let product = Product {
//!     code: "PNT-001".into(),
//!     packaging: "1L".into(),
//!     name: "Primer".into(),
//!     product_type: Some("Paint".into()),
//!     quantity: 12,
//!     sourcing_price_minor: 30000,
//!     selling_price_minor: 45000,
//!     deleted: false,
//!     deleted_at: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(Some(&product), 2).unwrap();
//! cart.add_item(Some(&product), 3).unwrap();
//!
//! assert_eq!(cart.item_count(), 1);
//! assert_eq!(cart.total(), Money::from_major(2250));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod export;
pub mod money;
pub mod receipt;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use export::{CsvTable, ExportError};
pub use money::Money;
pub use receipt::{Receipt, StoreInfo};
pub use report::{DateRange, Page, ReportWindow, SalesReport, TopProduct};
pub use stock::StockLevel;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products with fewer units than this are low on stock. Not configurable.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Rows per report page.
pub const REPORT_PAGE_SIZE: usize = 50;

/// Entries in the top-products ranking.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Maximum results of a product search.
pub const SEARCH_LIMIT: usize = 50;
