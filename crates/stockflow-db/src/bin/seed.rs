//! # Seed Data Generator
//!
//! Populates a database with a demo store for development.
//!
//! ## Usage
//! ```bash
//! # Catalog only
//! cargo run -p stockflow-db --bin seed
//!
//! # Catalog plus an opening inflow and a voucher to each sales area
//! cargo run -p stockflow-db --bin seed -- --with-stock
//!
//! # Specify database path
//! cargo run -p stockflow-db --bin seed -- --db ./data/stockflow.db
//! ```
//!
//! ## Generated Data
//! ```text
//! demo-store
//! ├── demo-wh   Back Room        (warehouse)
//! ├── demo-s1   Front Counter    (sales area)
//! └── demo-s2   Cafe Corner      (sales area)
//!
//! 12 products with cost and sale prices
//! ```
//!
//! Stock only ever enters through ledger batches, so `--with-stock` commits
//! real Inflow and Outflow(Voucher) batches instead of writing counters.

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;

use stockflow_core::rows::{InflowRow, OutflowRow};
use stockflow_core::{InflowSource, Location, LocationKind, OutflowDestination, Product, Store};
use stockflow_db::{Database, DbConfig};

const STORE_ID: &str = "demo-store";
const WAREHOUSE_ID: &str = "demo-wh";
const SALES_AREAS: &[(&str, &str)] = &[("demo-s1", "Front Counter"), ("demo-s2", "Cafe Corner")];

/// (id, name, unit, cost cents, sale cents)
const PRODUCTS: &[(&str, &str, &str, i64, i64)] = &[
    ("coffee-250", "Ground Coffee 250g", "bag", 850, 1999),
    ("coffee-1k", "Coffee Beans 1kg", "bag", 2900, 5499),
    ("tea-green", "Green Tea 20ct", "box", 210, 450),
    ("tea-black", "Black Tea 20ct", "box", 190, 425),
    ("sugar-1k", "Sugar 1kg", "bag", 120, 250),
    ("milk-1l", "Whole Milk 1L", "carton", 95, 189),
    ("oat-1l", "Oat Drink 1L", "carton", 160, 329),
    ("cup-12", "Paper Cup 12oz", "sleeve of 50", 600, 1250),
    ("lid-12", "Cup Lid 12oz", "sleeve of 50", 300, 700),
    ("croissant", "Butter Croissant", "unit", 70, 220),
    ("muffin", "Blueberry Muffin", "unit", 85, 275),
    ("water-500", "Still Water 500ml", "bottle", 30, 120),
];

const OPENING_STOCK: i64 = 60;
const VOUCHER_QTY: i64 = 15;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockflow_dev.db");
    let mut with_stock = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-stock" | "-s" => with_stock = true,
            "--help" | "-h" => {
                println!("Stockflow Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockflow_dev.db)");
                println!("  -s, --with-stock   Commit opening inflows and vouchers");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockflow Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let catalog = db.catalog();
    if catalog.get_store(STORE_ID).await?.is_some() {
        println!("⚠ Demo store already present");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    catalog
        .insert_store(&Store {
            id: STORE_ID.to_string(),
            name: "Demo Store".to_string(),
        })
        .await?;

    catalog
        .insert_location(&Location {
            id: WAREHOUSE_ID.to_string(),
            store_id: STORE_ID.to_string(),
            kind: LocationKind::Warehouse,
            name: "Back Room".to_string(),
        })
        .await?;

    for (id, name) in SALES_AREAS {
        catalog
            .insert_location(&Location {
                id: id.to_string(),
                store_id: STORE_ID.to_string(),
                kind: LocationKind::SalesArea,
                name: name.to_string(),
            })
            .await?;
    }
    println!("✓ Store with 1 warehouse and {} sales areas", SALES_AREAS.len());

    for (id, name, unit, cost, sale) in PRODUCTS {
        catalog
            .insert_product(&Product::new(*id, *name, *unit, *cost, *sale))
            .await?;
    }
    println!("✓ {} products", PRODUCTS.len());

    if with_stock {
        let today = Utc::now().date_naive();

        let inflows: Vec<InflowRow> = PRODUCTS
            .iter()
            .map(|(id, ..)| InflowRow {
                warehouse_id: WAREHOUSE_ID.to_string(),
                product_id: id.to_string(),
                quantity: OPENING_STOCK,
                source: InflowSource::Company {
                    provider: "Demo Wholesale".to_string(),
                },
                date: today,
                user_id: "seed".to_string(),
            })
            .collect();
        let receipt = db.engine().apply_inflows(&inflows).await?;
        println!("✓ Opening inflow batch {} ({} rows)", receipt.batch_id, receipt.rows_applied);

        for (area_id, name) in SALES_AREAS {
            let vouchers: Vec<OutflowRow> = PRODUCTS
                .iter()
                .map(|(id, ..)| OutflowRow {
                    warehouse_id: WAREHOUSE_ID.to_string(),
                    product_id: id.to_string(),
                    quantity: VOUCHER_QTY,
                    destination: OutflowDestination::Voucher {
                        sales_area_id: area_id.to_string(),
                    },
                    date: today,
                    user_id: "seed".to_string(),
                })
                .collect();
            let receipt = db.engine().apply_outflows(&vouchers).await?;
            println!("✓ Voucher batch {} to {}", receipt.batch_id, name);
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
