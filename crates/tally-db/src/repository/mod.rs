//! # Repository Module
//!
//! SQL for each table lives in one repository.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  InventoryStore (store.rs)                                             │
//! │       │                                                                 │
//! │       ├── ProductRepository      products       list / search / CRUD   │
//! │       │                                         add_stock, soft delete │
//! │       ├── SaleRepository         sales          list, atomic record    │
//! │       └── ProductTypeRepository  product_types  list / insert / delete │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod product_type;
pub mod sale;
