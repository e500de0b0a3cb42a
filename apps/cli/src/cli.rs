//! # Command Line
//!
//! `clap` definitions for the `tally` binary and the parsers for its
//! compound arguments.
//!
//! ```text
//! tally [--json] [--db PATH] <COMMAND>
//!
//!   products  list | deleted | search | add | edit | add-stock
//!             | delete | restore | purge
//!   types     list | add | delete
//!   sell      --item CODE/PACKAGING=QTY[@PRICE] ...
//!   report    --range today|yesterday|week|month|custom ...
//!   stock     low | value | export
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::commands::sale::SaleItemRequest;
use tally_core::validation::validate_price;
use tally_core::{DateRange, Money, ValidationError};

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Inventory and point-of-sale for a single store", version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    pub json: bool,

    #[arg(long, global = true, help = "Database file (overrides TALLY_DB_PATH)")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Product catalog
    #[command(subcommand)]
    Products(ProductsCommand),
    /// Product types
    #[command(subcommand)]
    Types(TypesCommand),
    /// Record a sale and print the receipt
    Sell(SellArgs),
    /// Sales report for a date range
    Report(ReportArgs),
    /// Stock alerts, value and export
    #[command(subcommand)]
    Stock(StockCommand),
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// Active products
    List,
    /// Soft-deleted products
    Deleted,
    /// Search code, name or packaging
    Search { query: String },
    Add(AddProductArgs),
    Edit(EditProductArgs),
    /// Add units to a product's stock
    AddStock {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long, help = "Units to add (at least 1)")]
        quantity: i64,
    },
    /// Move a product to the deleted list
    Delete(KeyArgs),
    /// Bring a deleted product back
    Restore(KeyArgs),
    /// Permanently remove a deleted product that has no sales
    Purge(KeyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    #[arg(long, help = "Product code")]
    pub code: String,
    #[arg(long, help = "Packaging, e.g. 4L or Box")]
    pub packaging: String,
}

#[derive(Debug, Clone, Args)]
pub struct AddProductArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub name: String,
    #[arg(long = "type", help = "Product type name")]
    pub product_type: String,
    #[arg(long)]
    pub packaging: String,
    #[arg(long, default_value_t = 0)]
    pub quantity: i64,
    #[arg(long, value_parser = parse_money, help = "Cost per unit")]
    pub sourcing_price: Money,
    #[arg(long, value_parser = parse_money, help = "Price per unit")]
    pub selling_price: Money,
}

#[derive(Debug, Clone, Args)]
pub struct EditProductArgs {
    #[command(flatten)]
    pub key: KeyArgs,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type", help = "Product type name; empty clears it")]
    pub product_type: Option<String>,
    #[arg(long)]
    pub quantity: Option<i64>,
    #[arg(long, value_parser = parse_money)]
    pub sourcing_price: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    pub selling_price: Option<Money>,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    List,
    Add { name: String },
    Delete { id: String },
}

// =============================================================================
// Sell
// =============================================================================

#[derive(Debug, Clone, Args)]
pub struct SellArgs {
    #[arg(
        long = "item",
        value_parser = parse_item,
        help = "CODE/PACKAGING=QTY[@PRICE]; repeat for more lines"
    )]
    pub items: Vec<SaleItemRequest>,

    #[arg(
        long,
        conflicts_with = "items",
        help = "Sell a single product, CODE/PACKAGING, without a cart"
    )]
    pub product: Option<String>,

    #[arg(long, default_value_t = 1, help = "Quantity for --product")]
    pub qty: i64,

    #[arg(long, action = ArgAction::SetTrue, help = "Do not print the receipt")]
    pub no_receipt: bool,
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    Today,
    Yesterday,
    Week,
    Month,
    Custom,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Defaults to `today`, or `custom` when `--from`/`--to` is given.
    #[arg(long, value_enum)]
    pub range: Option<RangeArg>,
    #[arg(long, help = "First day (YYYY-MM-DD); implies --range custom")]
    pub from: Option<NaiveDate>,
    #[arg(long, help = "Last day (YYYY-MM-DD); implies --range custom")]
    pub to: Option<NaiveDate>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, help = "Write the filtered sales to a CSV file")]
    pub export_sales: Option<PathBuf>,
    #[arg(long, help = "Write the filtered profit rows to a CSV file")]
    pub export_profit: Option<PathBuf>,
}

impl ReportArgs {
    /// A date bound switches the range to `custom`, as picking a date does
    /// on the reports screen. Combining one with a named range is an error.
    pub fn date_range(&self) -> Result<DateRange, String> {
        let dated = self.from.is_some() || self.to.is_some();
        let range = match (self.range, dated) {
            (Some(RangeArg::Custom), _) | (None, true) => RangeArg::Custom,
            (Some(named), false) => named,
            (None, false) => RangeArg::Today,
            (Some(_), true) => return Err("--from/--to only apply to --range custom".to_string()),
        };

        Ok(match range {
            RangeArg::Today => DateRange::Today,
            RangeArg::Yesterday => DateRange::Yesterday,
            RangeArg::Week => DateRange::Week,
            RangeArg::Month => DateRange::Month,
            RangeArg::Custom => DateRange::Custom {
                from: self.from,
                to: self.to,
            },
        })
    }
}

// =============================================================================
// Stock
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Products with fewer than 5 units
    Low,
    /// Stock on hand at cost
    Value,
    /// Write the catalog to a CSV file
    Export {
        path: PathBuf,
        #[arg(long, help = "Only products matching this search")]
        query: Option<String>,
    },
}

// =============================================================================
// Value Parsers
// =============================================================================

/// Amount such as `1200` or `1199.50`, within the accepted price range.
pub fn parse_money(s: &str) -> Result<Money, String> {
    let amount: Money = s.parse().map_err(|e: ValidationError| e.to_string())?;
    validate_price("price", amount).map_err(|e| e.to_string())?;
    Ok(amount)
}

/// `CODE/PACKAGING`.
pub fn parse_key(s: &str) -> Result<(String, String), String> {
    let (code, packaging) = s
        .split_once('/')
        .ok_or_else(|| format!("expected CODE/PACKAGING, got '{}'", s))?;
    let (code, packaging) = (code.trim(), packaging.trim());
    if code.is_empty() || packaging.is_empty() {
        return Err(format!("expected CODE/PACKAGING, got '{}'", s));
    }
    Ok((code.to_string(), packaging.to_string()))
}

/// `CODE/PACKAGING=QTY[@PRICE]`. Quantity range is checked by the cart.
pub fn parse_item(s: &str) -> Result<SaleItemRequest, String> {
    let (key, rest) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected CODE/PACKAGING=QTY[@PRICE], got '{}'", s))?;
    let (code, packaging) = parse_key(key)?;

    let (quantity, price) = match rest.split_once('@') {
        Some((q, p)) => (q, Some(parse_money(p)?)),
        None => (rest, None),
    };
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity '{}'", quantity.trim()))?;

    Ok(SaleItemRequest {
        code,
        packaging,
        quantity,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(
            parse_item("PNT-001/4L=3").unwrap(),
            SaleItemRequest {
                code: "PNT-001".to_string(),
                packaging: "4L".to_string(),
                quantity: 3,
                price: None,
            }
        );

        let item = parse_item("TIL-010/Sq Ft=12@85.5").unwrap();
        assert_eq!(item.packaging, "Sq Ft");
        assert_eq!(item.quantity, 12);
        assert_eq!(item.price, Some(Money::from_minor(8550)));
    }

    #[test]
    fn test_parse_item_errors() {
        assert!(parse_item("PNT-001=3").is_err());
        assert!(parse_item("PNT-001/4L").is_err());
        assert!(parse_item("PNT-001/4L=three").is_err());
        assert!(parse_item("PNT-001/4L=1@-5").is_err());
        assert!(parse_item("/4L=1").is_err());
    }

    #[test]
    fn test_sell_args() {
        let cli = Cli::try_parse_from([
            "tally",
            "--json",
            "sell",
            "--item",
            "PNT-001/4L=2",
            "--item",
            "TIL-010/Box=1@40",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Sell(args) => {
                assert_eq!(args.items.len(), 2);
                assert!(args.product.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["tally", "sell", "--item", "A/B=1", "--product", "A/B"]).is_err());
    }

    #[test]
    fn test_report_range() {
        let args = |argv: &[&str]| {
            let cli = Cli::try_parse_from(["tally", "report"].iter().chain(argv)).unwrap();
            let Commands::Report(args) = cli.command else {
                panic!("expected report");
            };
            args
        };
        let march = |d| NaiveDate::from_ymd_opt(2026, 3, d);

        assert_eq!(args(&[]).date_range(), Ok(DateRange::Today));
        assert_eq!(args(&["--range", "week"]).date_range(), Ok(DateRange::Week));
        assert_eq!(
            args(&["--range", "custom", "--from", "2026-03-01", "--to", "2026-03-15"]).date_range(),
            Ok(DateRange::Custom {
                from: march(1),
                to: march(15),
            })
        );
    }

    #[test]
    fn test_report_dates_imply_custom_range() {
        let cli = Cli::try_parse_from(["tally", "report", "--from", "2026-03-01"]).unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(
            args.date_range(),
            Ok(DateRange::Custom {
                from: NaiveDate::from_ymd_opt(2026, 3, 1),
                to: None,
            })
        );

        let cli = Cli::try_parse_from(["tally", "report", "--range", "month", "--to", "2026-03-15"]).unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert!(args.date_range().is_err());
    }

    #[test]
    fn test_parse_money_range() {
        assert_eq!(parse_money("1199.50"), Ok(Money::from_minor(119950)));
        assert!(parse_money("-1").is_err());
        assert!(parse_money("50000000000000000").is_err());
    }
}
