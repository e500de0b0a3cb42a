//! # Database Migrations
//!
//! Embedded SQL migrations and the schema capabilities derived from them.
//!
//! ## Capabilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Schema Version → Capabilities                           │
//! │                                                                         │
//! │  Database::new()                                                       │
//! │       │                                                                 │
//! │       ├── run pending migrations (when enabled)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MAX(version) FROM _sqlx_migrations                                    │
//! │       │                                                                 │
//! │       ├── 0  (no table)    → legacy, nothing optional                  │
//! │       ├── 1  initial       → soft_delete = false                       │
//! │       └── 2+ soft delete   → soft_delete = true                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SchemaCapabilities, fixed for the life of the handle                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads and writes branch on the capabilities; the schema is never re-inspected
//! per query.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones
//! 4. If the migration unlocks behavior, add a capability below

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// First schema version with `products.deleted` / `products.deleted_at`.
pub const SOFT_DELETE_VERSION: i64 = 2;

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Highest successfully applied migration version, 0 when none.
pub async fn applied_version(pool: &SqlitePool) -> i64 {
    let version: Result<Option<i64>, sqlx::Error> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await;

    match version {
        Ok(v) => v.unwrap_or(0),
        Err(e) => {
            debug!(error = %e, "No migration history, treating schema as version 0");
            0
        }
    }
}

/// Returns (total embedded migrations, applied version).
pub async fn migration_status(pool: &SqlitePool) -> (usize, i64) {
    (MIGRATOR.migrations.len(), applied_version(pool).await)
}

/// Optional behavior the open database supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCapabilities {
    pub version: i64,
    pub soft_delete: bool,
}

impl SchemaCapabilities {
    pub fn for_version(version: i64) -> Self {
        SchemaCapabilities {
            version,
            soft_delete: version >= SOFT_DELETE_VERSION,
        }
    }

    /// Capabilities of a database with every embedded migration applied.
    pub fn latest() -> Self {
        let version = MIGRATOR
            .migrations
            .iter()
            .map(|m| m.version)
            .max()
            .unwrap_or(0);
        Self::for_version(version)
    }

    pub async fn detect(pool: &SqlitePool) -> Self {
        let caps = Self::for_version(applied_version(pool).await);
        info!(version = caps.version, soft_delete = caps.soft_delete, "Schema capabilities");
        caps
    }
}
