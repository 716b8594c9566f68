//! # Seed Data Generator
//!
//! Populates a database with a small pharmacy catalog and pricing setup
//! for development and demos.
//!
//! ## Usage
//! ```bash
//! # Seed ./rxprice_dev.db
//! cargo run -p rxprice-db --bin seed
//!
//! # Specify database path
//! cargo run -p rxprice-db --bin seed -- --db ./data/rxprice.db
//! ```
//!
//! ## What Gets Created
//! - Products SP001..SP006 (prices in VND, no minor unit)
//! - Customer 1065 with a contract on SP001 at 85,000
//! - Volume tiers on SP001 (10% at 5+, 20% at 10+) and on category 3
//! - A "Weekend promo" rule in the default price book
//!
//! With this data, `SP001 × 12` prices at 85,000 for customer 1065
//! (contract) and at 80,000 for anyone else (volume tier).

use std::env;

use rxprice_core::rules::{Adjustment, PriceRule, RuleScope};
use rxprice_core::tiers::{TierScope, VolumeTier};
use rxprice_core::{Money, Percent, DEFAULT_PRICE_BOOK_ID};
use rxprice_db::{Database, DbConfig, NewProduct};

const ANALGESICS: i64 = 3;
const SUPPLEMENTS: i64 = 5;

/// (sku, barcode, name, category, base_price, sale_price, stock)
const PRODUCTS: &[(&str, &str, &str, i64, i64, Option<i64>, i64)] = &[
    ("SP001", "8934567000012", "Paracetamol 500mg (box of 100)", ANALGESICS, 100_000, None, 40),
    ("SP002", "8934567000029", "Ibuprofen 400mg (box of 50)", ANALGESICS, 65_000, Some(59_000), 25),
    ("SP003", "8934567000036", "Aspirin 81mg (box of 30)", ANALGESICS, 32_000, None, 3),
    ("SP004", "8934567000043", "Vitamin C 1000mg (tube of 20)", SUPPLEMENTS, 84_600, None, 120),
    ("SP005", "8934567000050", "Omega-3 Fish Oil (100 caps)", SUPPLEMENTS, 245_000, Some(229_000), 18),
    ("SP006", "8934567000067", "Zinc 15mg (box of 60)", SUPPLEMENTS, 118_000, None, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rxprice_dev.db");

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
                println!("rxprice Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rxprice_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 rxprice Seed Data Generator");
    println!("==============================");
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

    // Catalog
    let mut sp001_id = None;
    for &(sku, barcode, name, category, base, sale, stock) in PRODUCTS {
        let product = db
            .products()
            .insert(&NewProduct {
                sku: sku.to_string(),
                barcode: Some(barcode.to_string()),
                name: name.to_string(),
                category_id: Some(category),
                base_price: Some(base),
                sale_price: sale,
                current_stock: Some(stock),
            })
            .await?;
        if sku == "SP001" {
            sp001_id = Some(product.id);
        }
    }
    println!("✓ Inserted {} products", PRODUCTS.len());

    let sp001_id = sp001_id.ok_or("SP001 was not inserted")?;

    // Customers and contracts
    db.customers().insert(Some(1065), "Nhà thuốc Minh Châu", Some("0903123456")).await?;
    db.customers().insert(Some(1066), "Walk-in Retail", None).await?;
    db.contracts().insert(1065, sp001_id, 85_000).await?;
    println!("✓ Inserted customers 1065, 1066 and 1 contract price");

    // Volume tiers
    let tiers = [
        tier(TierScope::Sku, sp001_id, 5, Some(10.0), None, "Half case"),
        tier(TierScope::Sku, sp001_id, 10, Some(20.0), None, "Full case"),
        tier(TierScope::Category, SUPPLEMENTS, 24, None, Some(10_000), "Supplements bulk"),
    ];
    for t in &tiers {
        db.volume_tiers().insert(t).await?;
    }
    println!("✓ Inserted {} volume tiers", tiers.len());

    // Price rules
    db.price_rules()
        .insert(&PriceRule {
            id: 0,
            price_book_id: DEFAULT_PRICE_BOOK_ID.to_string(),
            name: "Weekend promo".to_string(),
            priority: 10,
            scope: RuleScope::Category,
            target_id: Some(ANALGESICS),
            min_qty: 1,
            adjustment: Adjustment::PercentOff(Percent::from_percentage(5.0)),
            effective_from: None,
            effective_to: None,
            is_active: true,
        })
        .await?;
    db.price_rules()
        .insert(&PriceRule {
            id: 0,
            price_book_id: DEFAULT_PRICE_BOOK_ID.to_string(),
            name: "Vitamin C clearance".to_string(),
            priority: 20,
            scope: RuleScope::Sku,
            target_id: db.products().find_by_code("SP004").await?.map(|p| p.id),
            min_qty: 1,
            adjustment: Adjustment::FixedPrice(Money::from_minor(72_000)),
            effective_from: None,
            effective_to: None,
            is_active: true,
        })
        .await?;
    println!("✓ Inserted 2 price rules in book '{}'", DEFAULT_PRICE_BOOK_ID);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn tier(
    scope: TierScope,
    target_id: i64,
    min_qty: i64,
    percent: Option<f64>,
    amount: Option<i64>,
    notes: &str,
) -> VolumeTier {
    VolumeTier {
        id: 0,
        scope,
        target_id,
        min_qty,
        max_qty: None,
        discount_percent: percent.map(Percent::from_percentage),
        discount_amount: amount.map(Money::from_minor),
        effective_from: None,
        effective_to: None,
        is_active: true,
        notes: Some(notes.to_string()),
    }
}
