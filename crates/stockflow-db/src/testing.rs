//! Shared fixtures for the crate's tests.
//!
//! ```text
//! store-1
//! ├── W   warehouse
//! ├── S1  sales area
//! └── S2  sales area
//!
//! P  Coffee 250g  cost 8.50  sale 19.99
//! Q  Sugar 1kg    cost 12.50 sale 20.00
//! ```

use chrono::NaiveDate;

use crate::repository::inventory;
use crate::repository::ledger::LedgerCounts;
use crate::{Database, DbConfig};
use stockflow_core::rows::{InflowRow, MovementRow, OutflowRow, SaleRow, WithdrawRow};
use stockflow_core::{
    InflowSource, InventoryRecord, Location, LocationKind, Money, MovementKind, OutflowDestination,
    PayMethod, Product, Store,
};

pub const STORE: &str = "store-1";
pub const WAREHOUSE: &str = "W";
pub const SALES_1: &str = "S1";
pub const SALES_2: &str = "S2";

const DAY: &str = "2024-02-20";
const USER: &str = "ana";

/// Fresh in-memory database with the fixture catalog.
pub async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed(&db).await;
    db
}

/// Inserts the fixture catalog.
pub async fn seed(db: &Database) {
    let catalog = db.catalog();

    catalog
        .insert_store(&Store {
            id: STORE.to_string(),
            name: "Main Street".to_string(),
        })
        .await
        .unwrap();

    for (id, kind) in [
        (WAREHOUSE, LocationKind::Warehouse),
        (SALES_1, LocationKind::SalesArea),
        (SALES_2, LocationKind::SalesArea),
    ] {
        catalog
            .insert_location(&Location {
                id: id.to_string(),
                store_id: STORE.to_string(),
                kind,
                name: format!("Location {id}"),
            })
            .await
            .unwrap();
    }

    catalog
        .insert_product(&Product::new("P", "Coffee 250g", "unit", 850, 1999))
        .await
        .unwrap();
    catalog
        .insert_product(&Product::new("Q", "Sugar 1kg", "unit", 1250, 2000))
        .await
        .unwrap();
}

/// Puts `qty` units on a counter without writing a ledger record.
pub async fn stock(db: &Database, location_id: &str, product_id: &str, qty: i64) {
    let mut conn = db.pool().acquire().await.unwrap();
    inventory::increment(&mut conn, location_id, product_id, qty)
        .await
        .unwrap();
}

/// Every counter plus ledger row totals, for before/after comparisons.
pub async fn snapshot(db: &Database) -> (Vec<InventoryRecord>, LedgerCounts) {
    let counters = sqlx::query_as::<_, InventoryRecord>(
        r#"
        SELECT location_id, product_id, quantity, min_stock
        FROM inventory
        ORDER BY location_id, product_id
        "#,
    )
    .fetch_all(db.pool())
    .await
    .unwrap();

    (counters, db.ledger().counts().await.unwrap())
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn inflow(warehouse_id: &str, product_id: &str, quantity: i64) -> InflowRow {
    InflowRow {
        warehouse_id: warehouse_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
        source: InflowSource::Company {
            provider: "Acme Foods".to_string(),
        },
        date: date(DAY),
        user_id: USER.to_string(),
    }
}

pub fn outflow(
    warehouse_id: &str,
    product_id: &str,
    quantity: i64,
    destination: OutflowDestination,
) -> OutflowRow {
    OutflowRow {
        warehouse_id: warehouse_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
        destination,
        date: date(DAY),
        user_id: USER.to_string(),
    }
}

pub fn movement(sales_area_id: &str, product_id: &str, quantity: i64, kind: MovementKind) -> MovementRow {
    MovementRow {
        sales_area_id: sales_area_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
        kind,
        date: date(DAY),
        user_id: USER.to_string(),
    }
}

pub fn sale(sales_area_id: &str, product_id: &str, quantity: i64, pay_method: PayMethod) -> SaleRow {
    SaleRow {
        sales_area_id: sales_area_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
        pay_method,
        date: date(DAY),
        user_id: USER.to_string(),
    }
}

pub fn withdrawal(sales_area_id: &str, cents: i64) -> WithdrawRow {
    WithdrawRow {
        sales_area_id: sales_area_id.to_string(),
        amount: Money::from_cents(cents),
        date: date(DAY),
        user_id: USER.to_string(),
    }
}
