//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line (`--db`)
//! 2. Environment variables (`TALLY_*`)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no lock needed.

use std::path::PathBuf;

use serde::Serialize;
use tally_core::{Money, StoreInfo};
use tracing::warn;

/// Narrowest and widest supported receipt paper, in characters.
pub const RECEIPT_WIDTH_RANGE: std::ops::RangeInclusive<usize> = 32..=64;

pub const DEFAULT_RECEIPT_WIDTH: usize = 42;

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Apply pending migrations when opening the database
    pub run_migrations: bool,

    /// Store name (printed on receipts)
    pub store_name: String,

    /// Store address lines (printed on receipts)
    pub store_address: Vec<String>,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Receipt line width in characters
    pub receipt_width: usize,
}

impl Default for ConfigState {
    fn default() -> Self {
        let store = StoreInfo::default();
        ConfigState {
            db_path: None,
            run_migrations: true,
            store_name: store.name,
            store_address: store.address_lines,
            currency_symbol: store.currency_symbol,
            receipt_width: DEFAULT_RECEIPT_WIDTH,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TALLY_DB_PATH`: database file
    /// - `TALLY_RUN_MIGRATIONS`: `0` or `false` opens the database as is
    /// - `TALLY_STORE_NAME`: store name on receipts
    /// - `TALLY_STORE_ADDRESS`: address lines separated by `|`
    /// - `TALLY_CURRENCY_SYMBOL`: e.g. `Rs.`
    /// - `TALLY_RECEIPT_WIDTH`: 32 to 64 characters
    pub fn from_env() -> Self {
        ConfigState::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(path) = lookup("TALLY_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup("TALLY_RUN_MIGRATIONS") {
            config.run_migrations = !matches!(flag.trim().to_lowercase().as_str(), "0" | "false" | "no");
        }

        if let Some(name) = lookup("TALLY_STORE_NAME").filter(|n| !n.trim().is_empty()) {
            config.store_name = name.trim().to_string();
        }

        if let Some(address) = lookup("TALLY_STORE_ADDRESS") {
            config.store_address = address
                .split('|')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(symbol) = lookup("TALLY_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol.trim().to_string();
        }

        if let Some(width) = lookup("TALLY_RECEIPT_WIDTH") {
            match width.trim().parse::<usize>() {
                Ok(w) if RECEIPT_WIDTH_RANGE.contains(&w) => config.receipt_width = w,
                _ => warn!(value = %width, "Ignoring TALLY_RECEIPT_WIDTH outside 32-64"),
            }
        }

        config
    }

    /// Receipt header details.
    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            name: self.store_name.clone(),
            address_lines: self.store_address.clone(),
            currency_symbol: self.currency_symbol.clone(),
        }
    }

    /// Formats an amount with the configured currency symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_minor(1234)), "Rs. 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }
}
