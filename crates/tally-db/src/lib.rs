//! # tally-db: Data Store for Tally
//!
//! SQLite storage behind the [`InventoryStore`] contract.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Data Flow                                │
//! │                                                                         │
//! │  CLI command (sell, products add, report ...)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ InventoryStore│    │  Repositories │    │  Migrations  │   │   │
//! │  │   │  (store.rs)   │───►│  product      │    │  001 schema  │   │   │
//! │  │   │               │    │  sale         │    │  002 soft    │   │   │
//! │  │   │ Database      │    │  product_type │    │      delete  │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded migrations and schema capabilities
//! - [`error`] - Database error types
//! - [`repository`] - Per-table SQL
//! - [`store`] - The [`InventoryStore`] contract
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig, InventoryStore};
//!
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//! let sale = db.record_sale(&SaleLine::new("PNT-001", "4L", 2)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, MIGRATION_HINT};
pub use migrations::SchemaCapabilities;
pub use pool::{Database, DbConfig, DbLocation};
pub use store::InventoryStore;

pub use repository::product::ProductRepository;
pub use repository::product_type::ProductTypeRepository;
pub use repository::sale::SaleRepository;
