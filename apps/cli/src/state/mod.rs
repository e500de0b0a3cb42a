//! # State Module
//!
//! Application state for the command layer. Each command takes only the
//! pieces it needs, passed in explicitly by the composition root.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  main.rs builds once per invocation:                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │ Arc<dyn          │  │ InventoryCache   │  │   ConfigState    │      │
//! │  │  InventoryStore> │  │                  │  │                  │      │
//! │  │                  │  │  RwLock<Vec<     │  │  db path         │      │
//! │  │  Database        │  │    Product>>     │  │  store name      │      │
//! │  │  (SQLite pool)   │  │  RwLock<Vec<     │  │  receipt width   │      │
//! │  │                  │  │    Sale>>        │  │                  │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Store: Database has internal connection pool (thread-safe)          │
//! │  • Cache: tokio RwLock, refetched in full after every write            │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cache;
mod config;

pub use cache::InventoryCache;
pub use config::{ConfigState, DEFAULT_RECEIPT_WIDTH, RECEIPT_WIDTH_RANGE};
