//! # Catalog Seeder
//!
//! Imports a product sheet into the database.
//!
//! ## Usage
//! ```bash
//! cargo run -p kassa-db --bin seed -- --file products.json
//!
//! # Specify database path
//! cargo run -p kassa-db --bin seed -- --file products.json --db ./data/kassa.db
//! ```
//!
//! The sheet format is described in [`kassa_db::import`]. Seeding is skipped
//! when the catalog already has products.

use std::env;
use std::path::PathBuf;

use kassa_db::import::parse_product_sheet;
use kassa_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut file: Option<PathBuf> = None;
    let mut db_path = String::from("./kassa_dev.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--file" | "-f" => {
                if i + 1 < args.len() {
                    file = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" => force = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let Some(file) = file else {
        print_help();
        return Err("--file is required".into());
    };

    println!("🌱 Kassa POS Catalog Seeder");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Sheet:    {}", file.display());
    println!();

    let json = std::fs::read_to_string(&file)?;
    let report = parse_product_sheet(&json)?;

    for skipped in &report.skipped {
        eprintln!("  Skipping row {}: {}", skipped.index, skipped.reason);
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 && !force {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Pass --force to import anyway.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let inserted = db.products().insert_bulk(&report.products).await?;
    let elapsed = start.elapsed();

    println!();
    println!(
        "✓ Imported {} products in {:?} ({} rows skipped)",
        inserted.len(),
        elapsed,
        report.skipped.len()
    );

    db.close().await;
    Ok(())
}

fn print_help() {
    println!("Kassa POS Catalog Seeder");
    println!();
    println!("Usage: seed --file <PATH> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -f, --file <PATH>  Product sheet (JSON array)");
    println!("  -d, --db <PATH>    Database file path (default: ./kassa_dev.db)");
    println!("      --force        Import even if products already exist");
    println!("  -h, --help         Show this help message");
}
