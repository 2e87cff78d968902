//! # Seed Data Generator
//!
//! Populates the database with development data for a perishable-goods
//! counter: categories, weighed products with opening balances, a few
//! manual stock adjustments, and one committed sale.
//!
//! ## Usage
//! ```bash
//! cargo run -p fresco-db --bin seed
//!
//! # Specify database path
//! cargo run -p fresco-db --bin seed -- --db ./data/fresco.db
//! ```

use chrono::{Days, Utc};
use std::env;

use fresco_core::cart::CartLine;
use fresco_core::AdjustmentReason;
use fresco_db::repository::ledger::AdjustStockRequest;
use fresco_db::repository::product::NewProduct;
use fresco_db::repository::sale::SaleRequest;
use fresco_db::{Store, StoreConfig};

/// (category, name, supplier, price cents/kg, opening grams, alert grams,
/// days until expiry)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64, u64)] = &[
    ("Cheese", "Parmigiano Reggiano", "Caseificio Rosso", 18_900, 6_000, 1_000, 120),
    ("Cheese", "Gorgonzola Dolce", "Caseificio Rosso", 12_500, 2_500, 500, 14),
    ("Cheese", "Burrata", "Latteria del Sud", 14_000, 1_200, 400, 3),
    ("Cheese", "Pecorino Toscano", "Fattoria Verde", 15_500, 3_000, 800, 60),
    ("Cured Meats", "Prosciutto di Parma", "Salumificio Bianchi", 24_000, 4_500, 1_000, 30),
    ("Cured Meats", "Speck Alto Adige", "Salumificio Bianchi", 19_500, 2_000, 600, 45),
    ("Cured Meats", "Mortadella", "Salumificio Bianchi", 9_900, 3_500, 800, 10),
    ("Olives & Antipasti", "Castelvetrano Olives", "Mercato Centrale", 7_500, 5_000, 1_500, 21),
    ("Olives & Antipasti", "Marinated Artichokes", "Mercato Centrale", 8_900, 2_200, 600, 6),
    ("Fresh Pasta", "Tagliatelle", "Pastificio Luna", 6_500, 1_800, 500, 2),
    ("Fresh Pasta", "Ravioli di Ricotta", "Pastificio Luna", 8_200, 1_500, 500, 2),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./fresco_dev.db");

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
                println!("Fresco POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./fresco_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Fresco POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let store = Store::new(StoreConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = store.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding categories and products...");

    let today = Utc::now().date_naive();
    let mut category_ids: Vec<(String, String)> = Vec::new();
    let mut product_ids: Vec<String> = Vec::new();

    for (category, name, supplier, price_cents, weight_g, alert_g, expiry_days) in PRODUCTS {
        let category_id = match category_ids.iter().find(|(n, _)| n == category) {
            Some((_, id)) => id.clone(),
            None => {
                let created = store.categories().create(category).await?;
                category_ids.push((category.to_string(), created.id.clone()));
                created.id
            }
        };

        let product = store
            .products()
            .create(&NewProduct {
                name: name.to_string(),
                category_id: Some(category_id),
                supplier: supplier.to_string(),
                price_cents: *price_cents,
                weight_g: *weight_g,
                stock_alert_g: *alert_g,
                expiry_date: today + Days::new(*expiry_days),
            })
            .await?;
        product_ids.push(product.id);
    }

    println!("  {} categories, {} products", category_ids.len(), product_ids.len());

    println!();
    println!("Recording sample stock adjustments...");

    store
        .ledger()
        .adjust(&AdjustStockRequest {
            product_id: product_ids[0].clone(),
            reason: AdjustmentReason::Add,
            delta_g: 2_000,
            notes: Some("morning delivery".to_string()),
        })
        .await?;
    store
        .ledger()
        .adjust(&AdjustStockRequest {
            product_id: product_ids[2].clone(),
            reason: AdjustmentReason::Remove,
            delta_g: -200,
            notes: Some("spoilage".to_string()),
        })
        .await?;

    println!();
    println!("Committing a sample sale...");

    let receipt = store
        .sales()
        .commit(&SaleRequest {
            lines: vec![
                CartLine {
                    product_id: product_ids[0].clone(),
                    weight_g: 350,
                },
                CartLine {
                    product_id: product_ids[4].clone(),
                    weight_g: 200,
                },
            ],
            discount_pct: 0,
            amount_paid_cents: 20_000,
        })
        .await?;

    println!(
        "  Receipt {} - total {} cents, change {} cents",
        receipt.sale.receipt_no, receipt.sale.total_cents, receipt.sale.change_cents
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
