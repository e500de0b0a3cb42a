//! # Tally Entry Point
//!
//! ## Startup Sequence
//! 1. Parse the command line
//! 2. Initialize tracing (stderr)
//! 3. Load configuration (`TALLY_*`, `--db`)
//! 4. Open the database, apply migrations, detect capabilities
//! 5. Load the product/sales cache
//! 6. Run one command and print its result (text or `--json`)
//!
//! A failed command prints its title and description and exits non-zero.
//! A write whose follow-up cache refresh failed prints a stale-data warning.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use serde_json::json;

use tally_cli::cli::{
    parse_key, AddProductArgs, Cli, Commands, EditProductArgs, ProductsCommand, ReportArgs, SellArgs,
    StockCommand, TypesCommand,
};
use tally_cli::commands::catalog::{self, ProductEdit};
use tally_cli::commands::{report, sale, stale_cache_warning, stock, types};
use tally_cli::error::ApiError;
use tally_cli::state::{ConfigState, InventoryCache};
use tally_core::{Product, ProductDraft, Sale};
use tally_db::InventoryStore;

/// Everything a command may need, built once per invocation.
struct CliContext {
    store: Arc<dyn InventoryStore>,
    cache: InventoryCache,
    config: ConfigState,
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tally_cli::init_tracing();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api) if json => {
                    let body = serde_json::to_string_pretty(api).unwrap_or_else(|_| api.message.clone());
                    eprintln!("{}", body);
                }
                Some(api) => {
                    let (title, description) = api.user_message();
                    eprintln!("{}: {}", title, description);
                }
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigState::from_env();
    if let Some(path) = cli.db {
        config.db_path = Some(path);
    }

    let db = tally_cli::open_database(&config).await?;
    let store: Arc<dyn InventoryStore> = Arc::new(db);
    let cache = InventoryCache::load(store.as_ref()).await.map_err(ApiError::from)?;

    let context = CliContext {
        store,
        cache,
        config,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Products(command) => handle_products_command(&context, command).await,
        Commands::Types(command) => handle_types_command(&context, command).await,
        Commands::Sell(args) => handle_sell(&context, args).await,
        Commands::Report(args) => handle_report(&context, args).await,
        Commands::Stock(command) => handle_stock_command(&context, command).await,
    };

    // Also after a failed bulk sale, whose earlier lines did commit
    if let Some(warning) = stale_cache_warning(&context.cache) {
        if context.json {
            eprintln!("{}", warning);
        } else {
            println!("{}", warning);
        }
    }
    result
}

// =============================================================================
// Products
// =============================================================================

async fn handle_products_command(context: &CliContext, command: ProductsCommand) -> Result<()> {
    let store = context.store.as_ref();
    let cache = &context.cache;

    match command {
        ProductsCommand::List => {
            let products = catalog::list_products(cache).await;
            output_products(context, &products)
        }
        ProductsCommand::Deleted => {
            let products = catalog::list_deleted(store).await?;
            if context.json {
                return print_json(&products);
            }
            if !store.capabilities().soft_delete {
                println!("This database does not support deleted products yet.");
                return Ok(());
            }
            for p in &products {
                let deleted_at = p
                    .deleted_at
                    .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:<16} {:<12} {:<28} deleted {}", p.code, p.packaging, p.name, deleted_at);
            }
            println!("{} deleted product(s)", products.len());
            Ok(())
        }
        ProductsCommand::Search { query } => {
            let products = catalog::search_products(cache, &query).await;
            output_products(context, &products)
        }
        ProductsCommand::Add(args) => {
            let product = catalog::add_product(store, cache, draft_from(args)).await?;
            output_product_change(context, "Added", &product)
        }
        ProductsCommand::Edit(args) => {
            let product = catalog::edit_product(store, cache, edit_from(args)).await?;
            output_product_change(context, "Updated", &product)
        }
        ProductsCommand::AddStock { key, quantity } => {
            let level = catalog::add_stock(store, cache, &key.code, &key.packaging, quantity).await?;
            if context.json {
                return print_json(&json!({ "code": key.code, "packaging": key.packaging, "quantity": level }));
            }
            println!("{} ({}): {} in stock", key.code.to_uppercase(), key.packaging, level);
            Ok(())
        }
        ProductsCommand::Delete(key) => {
            catalog::delete_product(store, cache, &key.code, &key.packaging).await?;
            output_done(context, "deleted", &key.code, &key.packaging)
        }
        ProductsCommand::Restore(key) => {
            catalog::restore_product(store, cache, &key.code, &key.packaging).await?;
            output_done(context, "restored", &key.code, &key.packaging)
        }
        ProductsCommand::Purge(key) => {
            catalog::purge_product(store, cache, &key.code, &key.packaging).await?;
            output_done(context, "purged", &key.code, &key.packaging)
        }
    }
}

fn draft_from(args: AddProductArgs) -> ProductDraft {
    ProductDraft {
        code: args.code,
        name: args.name,
        product_type: args.product_type,
        packaging: args.packaging,
        quantity: args.quantity,
        sourcing_price: args.sourcing_price,
        selling_price: args.selling_price,
    }
}

fn edit_from(args: EditProductArgs) -> ProductEdit {
    ProductEdit {
        code: args.key.code,
        packaging: args.key.packaging,
        name: args.name,
        product_type: args.product_type,
        quantity: args.quantity,
        sourcing_price: args.sourcing_price,
        selling_price: args.selling_price,
    }
}

fn output_products(context: &CliContext, products: &[Product]) -> Result<()> {
    if context.json {
        return print_json(&products);
    }
    println!(
        "{:<16} {:<12} {:<28} {:<12} {:>6} {:>14} {:>14}",
        "CODE", "PACKAGING", "NAME", "TYPE", "QTY", "SELL", "COST"
    );
    for p in products {
        println!(
            "{:<16} {:<12} {:<28} {:<12} {:>6} {:>14} {:>14}",
            p.code,
            p.packaging,
            p.name,
            p.product_type.as_deref().unwrap_or("-"),
            p.quantity,
            context.config.format_currency(p.selling_price()),
            context.config.format_currency(p.sourcing_price()),
        );
    }
    println!("{} product(s)", products.len());
    Ok(())
}

fn output_product_change(context: &CliContext, verb: &str, product: &Product) -> Result<()> {
    if context.json {
        return print_json(product);
    }
    println!("{} {}: {} in stock", verb, product.key(), product.quantity);
    Ok(())
}

fn output_done(context: &CliContext, what: &str, code: &str, packaging: &str) -> Result<()> {
    if context.json {
        return print_json(&json!({ "code": code, "packaging": packaging, "result": what }));
    }
    println!("{} ({}) {}", code.trim().to_uppercase(), packaging.trim(), what);
    Ok(())
}

// =============================================================================
// Types
// =============================================================================

async fn handle_types_command(context: &CliContext, command: TypesCommand) -> Result<()> {
    let store = context.store.as_ref();

    match command {
        TypesCommand::List => {
            let list = types::list_types(store).await?;
            if context.json {
                return print_json(&list);
            }
            for t in &list {
                println!("{:<38} {}", t.id, t.name);
            }
            println!("{} type(s)", list.len());
        }
        TypesCommand::Add { name } => {
            let added = types::add_type(store, &name).await?;
            if context.json {
                return print_json(&added);
            }
            match added {
                Some(t) => println!("Added type {} ({})", t.name, t.id),
                None => println!("Nothing to add"),
            }
        }
        TypesCommand::Delete { id } => {
            types::delete_type(store, &id).await?;
            if context.json {
                return print_json(&json!({ "id": id, "result": "deleted" }));
            }
            println!("Deleted type {}", id);
        }
    }
    Ok(())
}

// =============================================================================
// Sell
// =============================================================================

async fn handle_sell(context: &CliContext, args: SellArgs) -> Result<()> {
    let store = context.store.as_ref();
    let cache = &context.cache;

    let cart = sale::stage_cart(cache, &args.items).await?;
    let selected = match &args.product {
        Some(raw) => {
            let (code, packaging) = parse_key(raw).map_err(ApiError::validation)?;
            let product = cache
                .find_product(&code, &packaging)
                .await
                .ok_or_else(|| ApiError::not_found("Product", &format!("{} ({})", code, packaging)))?;
            Some(product)
        }
        None => None,
    };

    let result = sale::checkout(store, cache, &context.config, &cart, selected.as_ref(), args.qty).await;

    let checkout = match result {
        Ok(checkout) => checkout,
        Err(failure) => {
            if failure.is_partial() && !context.json {
                println!("Recorded before the failure:");
                output_sales(context, &failure.committed);
            }
            if failure.is_partial() && context.json {
                print_json(&failure)?;
            }
            return Err(ApiError::from(failure).into());
        }
    };

    if context.json {
        return print_json(&checkout);
    }
    if args.no_receipt {
        println!(
            "Recorded {} sale(s), total {}",
            checkout.sales.len(),
            context.config.format_currency(checkout.receipt.total)
        );
    } else {
        print!("{}", checkout.receipt.render_text(context.config.receipt_width));
    }
    Ok(())
}

fn output_sales(context: &CliContext, sales: &[Sale]) {
    for s in sales {
        println!(
            "{}  {:<16} {:<12} {:<28} {:>5} x {:>12} = {:>12}",
            s.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            s.product_code,
            s.packaging,
            s.name,
            s.quantity_sold,
            context.config.format_currency(s.selling_price()),
            context.config.format_currency(s.revenue()),
        );
    }
}

// =============================================================================
// Report
// =============================================================================

async fn handle_report(context: &CliContext, args: ReportArgs) -> Result<()> {
    let range = args.date_range().map_err(ApiError::validation)?;
    let built = report::sales_report(&context.cache, range, &Local::now()).await?;
    let view = report::report_view(range, &built, args.page);

    let mut exported = Vec::new();
    if let Some(path) = &args.export_sales {
        let rows = report::export_sales(&built, &Local, path)?;
        exported.push(("sales", path, rows));
    }
    if let Some(path) = &args.export_profit {
        let rows = report::export_profit(&built, path)?;
        exported.push(("profit", path, rows));
    }

    if context.json {
        let exports: Vec<_> = exported
            .iter()
            .map(|(kind, path, rows)| json!({ "kind": kind, "path": path, "rows": rows }))
            .collect();
        return print_json(&json!({ "report": view, "exports": exports }));
    }

    let fmt = |m| context.config.format_currency(m);
    println!(
        "Sales {} to {}",
        view.window.start.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        view.window.end.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!("  Revenue:      {}", fmt(view.total_revenue));
    println!("  Profit:       {}", fmt(view.total_profit));
    println!("  Units sold:   {}", view.total_sold);
    println!("  Transactions: {}", view.transactions);

    if !view.top_products.is_empty() {
        println!();
        println!("Top products");
        for (i, top) in view.top_products.iter().enumerate() {
            println!("  {}. {:<16} {:<28} {:>6}", i + 1, top.product_code, top.name, top.quantity_sold);
        }
    }

    println!();
    output_sales(context, &view.page.items);
    println!(
        "Page {} of {} ({} sale(s))",
        view.page.page,
        view.page.total_pages.max(1),
        view.page.total_items
    );

    for (kind, path, rows) in &exported {
        println!("Wrote {} {} row(s) to {}", rows, kind, path.display());
    }
    Ok(())
}

// =============================================================================
// Stock
// =============================================================================

async fn handle_stock_command(context: &CliContext, command: StockCommand) -> Result<()> {
    let cache = &context.cache;

    match command {
        StockCommand::Low => {
            let rows = stock::low_stock(cache).await;
            if context.json {
                return print_json(&rows);
            }
            for row in &rows {
                println!(
                    "{:<9} {:<16} {:<12} {:<28} {:>4}",
                    row.level.label(),
                    row.product.code,
                    row.product.packaging,
                    row.product.name,
                    row.product.quantity
                );
            }
            println!("{} product(s) low on stock", rows.len());
        }
        StockCommand::Value => {
            let value = stock::store_value(cache).await;
            if context.json {
                return print_json(&json!({ "storeValue": value }));
            }
            println!("Store value at cost: {}", context.config.format_currency(value));
        }
        StockCommand::Export { path, query } => {
            let rows = stock::export_stock(cache, &path, query.as_deref()).await?;
            if context.json {
                return print_json(&json!({ "path": path, "rows": rows }));
            }
            println!("Wrote {} product row(s) to {}", rows, path.display());
        }
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_cli::cli::KeyArgs;
    use tally_core::Money;

    #[test]
    fn test_edit_from_keeps_unset_fields_empty() {
        let edit = edit_from(EditProductArgs {
            key: KeyArgs {
                code: "pnt-001".to_string(),
                packaging: "4L".to_string(),
            },
            name: None,
            product_type: None,
            quantity: None,
            sourcing_price: None,
            selling_price: Some(Money::from_minor(100)),
        });
        assert_eq!(edit.code, "pnt-001");
        assert!(edit.name.is_none());
        assert_eq!(edit.selling_price, Some(Money::from_minor(100)));
    }
}
