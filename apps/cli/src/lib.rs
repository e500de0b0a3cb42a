//! # Tally CLI Library
//!
//! Composition root and command layer for the `tally` binary.
//!
//! ## Module Organization
//! ```text
//! tally_cli/
//! ├── lib.rs          ◄─── You are here (logging, database opening)
//! ├── cli.rs          ◄─── clap definitions and argument parsers
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cache.rs    ◄─── Product/sales cache, refetched after writes
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── catalog.rs  ◄─── Product CRUD, stock add, soft delete
//! │   ├── sale.rs     ◄─── Cart staging, bulk sale, receipt
//! │   ├── report.rs   ◄─── Date-range reports and exports
//! │   ├── stock.rs    ◄─── Low stock, store value, stock export
//! │   └── types.rs    ◄─── Product type registry
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## No Global Handle
//! The database is opened in `main`, wrapped in `Arc<dyn InventoryStore>`
//! and passed to every command. Tests pass an in-memory store instead.

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::ApiError;
use state::ConfigState;
use tally_db::{Database, DbConfig};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_db=trace` - Trace the database layer only
/// - Default: `info,tally=debug,sqlx=warn`
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
/// - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
/// - **Linux**: `~/.local/share/pos/tally.db`
///
/// ## Override
/// `--db` or `TALLY_DB_PATH`.
pub fn database_path(config: &ConfigState) -> Result<PathBuf, ApiError> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "tally", "pos")
        .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        ApiError::internal(format!("Could not create {}: {}", data_dir.display(), e))
    })?;

    Ok(data_dir.join("tally.db"))
}

/// Opens the database the configuration points at.
pub async fn open_database(config: &ConfigState) -> Result<Database, ApiError> {
    let path = database_path(config)?;
    info!(?path, "Database path determined");

    let db = Database::new(DbConfig::new(path).run_migrations(config.run_migrations)).await?;
    info!(
        version = db.capabilities().version,
        soft_delete = db.capabilities().soft_delete,
        "Database ready"
    );
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_db::InventoryStore;

    #[tokio::test]
    async fn test_open_database_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState {
            db_path: Some(dir.path().join("shop.db")),
            ..ConfigState::default()
        };

        assert_eq!(database_path(&config).unwrap(), dir.path().join("shop.db"));

        let db = open_database(&config).await.unwrap();
        assert!(db.capabilities().soft_delete);
        assert!(db.list_products().await.unwrap().is_empty());
        db.close().await;
    }
}
