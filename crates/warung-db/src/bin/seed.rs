//! # Seed Data Generator
//!
//! Populates a development database with a small warung catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p warung-db --bin seed
//! cargo run -p warung-db --bin seed -- --db ./data/warung.db
//! ```
//!
//! ## Generated Data
//! - Products, some sold by the package (dus, renceng, karton)
//! - Payment methods: Tunai, Transfer, QRIS, Hutang
//! - A few regular customers

use std::env;

use warung_core::{Money, NewCustomer, Product};
use warung_db::{Database, DbConfig};

/// (name, unit price, package qty, package price, purchase price, stock)
const PRODUCTS: &[(&str, i64, i64, Option<i64>, i64, i64)] = &[
    ("Indomie Goreng", 3_500, 40, Some(120_000), 2_900, 120),
    ("Indomie Soto", 3_300, 40, Some(114_000), 2_750, 80),
    ("Aqua 600ml", 4_000, 24, Some(84_000), 3_100, 96),
    ("Teh Botol Sosro 450ml", 5_000, 12, Some(54_000), 4_000, 48),
    ("Kopi Kapal Api Sachet", 1_500, 10, Some(13_000), 1_150, 200),
    ("Beras Ramos 5kg", 72_000, 0, None, 65_000, 15),
    ("Gula Pasir 1kg", 17_500, 0, None, 15_500, 30),
    ("Minyak Goreng 2L", 36_000, 6, Some(205_000), 32_000, 18),
    ("Telur Ayam (butir)", 2_200, 30, Some(60_000), 1_800, 150),
    ("Rokok Surya 12", 32_000, 10, Some(310_000), 29_500, 40),
    ("Sabun Lifebuoy", 4_500, 0, None, 3_600, 36),
    ("Garam Dapur", 3_000, 0, None, 2_200, 25),
];

const PAYMENT_METHODS: &[&str] = &["Tunai", "Transfer", "QRIS", "Hutang"];

/// (name, phone, address)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Budi Santoso", "081234567890", "Jl. Melati 3"),
    ("Siti Aminah", "081298765432", "Gg. Mawar 12"),
    ("Pak RT", "", "Pos Ronda"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./warung_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Warung POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./warung_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Warung POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding products...");
    for &(name, unit, package_qty, package_price, purchase, stock) in PRODUCTS {
        let mut product = Product::new(name, Money::from_units(unit));
        product.package_qty = package_qty;
        product.package_price = package_price.map(Money::from_units);
        product.purchase_price = Money::from_units(purchase);
        product.stock = stock;

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", name, e);
        }
    }
    println!("  {} products", db.products().count().await?);

    println!("Seeding payment methods...");
    for name in PAYMENT_METHODS {
        if db.payment_methods().find_by_name(name).await?.is_none() {
            db.payment_methods().insert(name).await?;
        }
    }
    println!("  {} payment methods", db.payment_methods().list().await?.len());

    println!("Seeding customers...");
    for &(name, phone, address) in CUSTOMERS {
        let details = NewCustomer {
            name: name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
        };
        db.customers().insert(&details).await?;
    }
    println!("  {} customers", CUSTOMERS.len());

    println!();
    let hits = db.products().search("indomie", 10).await?;
    println!("Search 'indomie': {} results", hits.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
