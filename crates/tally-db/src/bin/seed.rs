//! # Seed Data Generator
//!
//! Fills an empty database with demo product types and products.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin seed
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --variants 3
//! ```
//!
//! ## Generated Products
//! One product per (item, packaging) pair. Codes follow `{PREFIX}-{NNN}`,
//! prices are deterministic so repeated seeds of fresh files match.

use std::env;
use tally_core::Product;
use tally_db::{Database, DbConfig, InventoryStore};

/// (type, code prefix, items, packagings)
const CATALOG: &[(&str, &str, &[&str], &[&str])] = &[
    (
        "Paint",
        "PNT",
        &["Weather Shield", "Silk Emulsion", "Matt Enamel", "Wood Primer"],
        &["1L", "4L", "16L"],
    ),
    (
        "Tiles",
        "TIL",
        &["Floor Tiles, White", "Wall Tiles, Ivory", "Porcelain Grey"],
        &["Box", "Sq Ft"],
    ),
    (
        "Sanitary",
        "SAN",
        &["Basin Mixer", "Shower Set", "Commode Seat"],
        &["Piece"],
    ),
    (
        "Hardware",
        "HRD",
        &["Paint Brush 4in", "Roller 9in", "Tile Grout"],
        &["Piece", "Pack"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tally_dev.db");
    let mut variants: usize = usize::MAX;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--variants" | "-v" => {
                if i + 1 < args.len() {
                    variants = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./tally_dev.db)");
                println!("  -v, --variants <N>     Packagings per item (default: all)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database (schema version {})", db.capabilities().version);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut generated = 0;
    for (type_idx, (type_name, prefix, items, packagings)) in CATALOG.iter().enumerate() {
        if let Err(e) = db.insert_type(type_name).await {
            eprintln!("Failed to insert type {}: {}", type_name, e);
        }

        for (item_idx, item) in items.iter().enumerate() {
            for (pack_idx, packaging) in packagings.iter().take(variants).enumerate() {
                let seed = type_idx * 100 + item_idx * 10 + pack_idx;
                let product = generate_product(type_name, prefix, item, packaging, item_idx, pack_idx, seed);

                if let Err(e) = db.insert_product(&product).await {
                    eprintln!("Failed to insert {}: {}", product.key(), e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products", generated);
    println!("✓ Seed complete!");
    Ok(())
}

/// Builds one demo product. Larger packagings cost proportionally more.
fn generate_product(
    type_name: &str,
    prefix: &str,
    item: &str,
    packaging: &str,
    item_idx: usize,
    pack_idx: usize,
    seed: usize,
) -> Product {
    let base = 25_000 + ((seed * 3_700) % 90_000) as i64;
    let sourcing = base * (pack_idx as i64 * 3 + 1);
    // 20-35% margin
    let margin = 120 + (seed % 16) as i64;

    Product {
        code: format!("{}-{:03}", prefix, item_idx + 1),
        packaging: packaging.to_string(),
        name: item.to_string(),
        product_type: Some(type_name.to_string()),
        // Some items start low so the low-stock report has something to show
        quantity: (seed % 23) as i64,
        sourcing_price_minor: sourcing,
        selling_price_minor: sourcing * margin / 100,
        deleted: false,
        deleted_at: None,
    }
}
