//! # Opening the Store
//!
//! A [`Database`] is one SQLite file (or an in-memory database in tests)
//! behind a `sqlx` pool, plus the [`SchemaCapabilities`] read once at open.
//!
//! ## Open Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path)          DbConfig::in_memory()                     │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  DbLocation::File             DbLocation::Memory                        │
//! │  (create, WAL, busy wait)     (single shared connection)                │
//! │       └──────────────┬───────────────┘                                  │
//! │                      ▼                                                  │
//! │         foreign_keys = ON, pool connect                                 │
//! │                      ▼                                                  │
//! │         migrations (unless disabled)                                    │
//! │                      ▼                                                  │
//! │         SchemaCapabilities::detect  ──► fixed for the handle's life     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handle is passed to whoever needs it; nothing here is process-global.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, SchemaCapabilities};
use crate::repository::product::ProductRepository;
use crate::repository::product_type::ProductTypeRepository;
use crate::repository::sale::SaleRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A database file, created on first open.
    File(PathBuf),
    /// A private in-memory database. Gone when the handle is dropped.
    Memory,
}

/// How to open the store.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/tally/tally.db")
///     .pool_size(4)
///     .run_migrations(false);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Connections in the pool. A sale holds one for the length of its
    /// transaction. Default: 4
    pub pool_size: u32,

    /// How long a command waits for a free connection. Default: 10s
    pub acquire_timeout: Duration,

    /// How long SQLite waits on a locked file before failing. Default: 5s
    pub busy_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            pool_size: 4,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// In-memory store for tests. Always a single connection, since every
    /// SQLite `:memory:` connection is a separate database.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            pool_size: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            run_migrations: true,
        }
    }

    /// Ignored for in-memory stores.
    pub fn pool_size(mut self, size: u32) -> Self {
        if self.location != DbLocation::Memory {
            self.pool_size = size.max(1);
        }
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// With migrations off, the handle works against whatever schema the
    /// file already has, with capabilities to match.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            DbLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        };

        // Sales reference products; purges depend on it
        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// An open store. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    capabilities: SchemaCapabilities,
}

impl Database {
    /// Opens the store described by `config`.
    ///
    /// ## Returns
    /// * `Ok(Database)` - connected, migrated (if enabled), capabilities known
    /// * `Err(DbError::ConnectionFailed)` - the file could not be opened
    /// * `Err(DbError::MigrationFailed)` - a pending migration failed
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, pool_size = config.pool_size, "Opening database");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout);
        if config.location == DbLocation::Memory {
            // Closing the last connection would drop the data
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!("Pool connected");

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        let capabilities = SchemaCapabilities::detect(&pool).await;
        info!(
            version = capabilities.version,
            soft_delete = capabilities.soft_delete,
            migrated = config.run_migrations,
            "Database open"
        );

        Ok(Database { pool, capabilities })
    }

    /// The underlying pool, for queries outside the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn capabilities(&self) -> SchemaCapabilities {
        self.capabilities
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.capabilities)
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.capabilities)
    }

    pub fn product_types(&self) -> ProductTypeRepository {
        ProductTypeRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries and closes every connection.
    pub async fn close(&self) {
        debug!("Closing database");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_fully_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.capabilities(), SchemaCapabilities::latest());
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_without_migrations_has_no_capabilities() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        assert_eq!(db.capabilities().version, 0);
        assert!(!db.capabilities().soft_delete);
    }

    #[tokio::test]
    async fn test_file_database_persists_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path).run_migrations(false))
            .await
            .unwrap();
        assert!(reopened.capabilities().soft_delete);
        reopened.close().await;
    }

    #[test]
    fn test_pool_size_is_fixed_for_memory() {
        assert_eq!(DbConfig::new("/tmp/tally.db").pool_size(8).pool_size, 8);
        assert_eq!(DbConfig::new("/tmp/tally.db").pool_size(0).pool_size, 1);
        assert_eq!(DbConfig::in_memory().pool_size(8).pool_size, 1);
    }
}
