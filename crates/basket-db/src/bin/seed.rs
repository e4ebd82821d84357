//! # Seed Data
//!
//! Populates the database with the demo catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./basket_dev.db
//! cargo run -p basket-db --bin seed
//!
//! # Specify database path, and also create a demo basket
//! cargo run -p basket-db --bin seed -- --db ./data/basket.db --basket
//! ```
//!
//! ## Seeded Catalog
//! | Code  | Price | Discount          |
//! |-------|-------|-------------------|
//! | A0001 | 12.99 | TEN_PERCENT_OFF   |
//! | A0002 | 3.99  | BUY_1_GET_1_FREE  |
//! | A0003 | 9.99  | -                 |
//!
//! The demo basket holds 2 × A0001, 3 × A0002 and 1 × A0003 with both
//! discounts attached, and totals 41.35.

use std::env;

use anyhow::Context;
use basket_core::{Basket, Discount, DiscountType, Money, Product};
use basket_db::{Database, DbConfig};

const CATALOG: &[(&str, i64)] = &[("A0001", 1299), ("A0002", 399), ("A0003", 999)];

const DISCOUNTS: &[(DiscountType, &str)] = &[
    (DiscountType::TenPercentOff, "A0001"),
    (DiscountType::BuyOneGetOneFree, "A0002"),
];

/// Line items of the demo basket, by code.
const DEMO_BASKET: &[&str] = &["A0001", "A0001", "A0002", "A0002", "A0002", "A0003"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./basket_dev.db");
    let mut with_basket = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--basket" | "-b" => with_basket = true,
            "--help" | "-h" => {
                println!("Basket Pricing Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./basket_dev.db)");
                println!("  -b, --basket       Also create a demo basket");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Basket Pricing Seed Data");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut products = Vec::with_capacity(CATALOG.len());
    for (code, cents) in CATALOG {
        let product = db
            .products()
            .insert(&Product::new(*code, Money::from_cents(*cents)))
            .await?;
        println!("  + product {} @ {}", product.code, product.price);
        products.push(product);
    }

    let mut discounts = Vec::with_capacity(DISCOUNTS.len());
    for (kind, code) in DISCOUNTS {
        let discount = db.discounts().insert(&Discount::new(*kind, *code)).await?;
        println!("  + discount {} on {}", discount.discount_type, discount.product_code);
        discounts.push(discount);
    }

    if with_basket {
        let mut basket = Basket::new();
        for code in DEMO_BASKET {
            let product = products
                .iter()
                .find(|p| p.code == *code)
                .with_context(|| format!("demo product {} missing", code))?;
            basket.add_product(product.clone());
        }
        for discount in &discounts {
            basket.add_discount(discount.clone());
        }
        db.baskets().insert(&basket).await?;
        println!("  + basket {} (total {})", basket.id, basket.total());
    }

    println!();
    println!("✓ Seed complete");

    db.close().await;
    Ok(())
}
