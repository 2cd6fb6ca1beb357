//! # Commands Module
//!
//! Every operation exposed to UI collaborators.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (BatchAck, exports)
//! ├── inflow.rs     ◄─── submit_inflows
//! ├── outflow.rs    ◄─── submit_outflows
//! ├── movement.rs   ◄─── submit_movements
//! ├── sale.rs       ◄─── submit_sales
//! ├── withdraw.rs   ◄─── submit_withdrawals, available_cash
//! └── inventory.rs  ◄─── list_in_stock, list_low_stock, get_quantity,
//!                        set_min_stock
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI collaborator                                                        │
//! │  ───────────────                                                        │
//! │  {"command": "submit_sales",                                            │
//! │   "rows": [{"sales_area_id": "S1", "product_id": "P",                   │
//! │             "quantity": "3", "pay_method": "cash",                      │
//! │             "date": "20/02/2024", "user_id": "ana"}]}                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  pub async fn submit_sales(                                             │
//! │      db: &Database,                                                     │
//! │      rows: Vec<SaleRowInput>,   ◄── raw strings, parsed here            │
//! │  ) -> Result<BatchAck, ApiError>                                        │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  {"batchId": "…", "rowsApplied": 1}                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use stockflow_db::BatchReceipt;

pub mod inflow;
pub mod inventory;
pub mod movement;
pub mod outflow;
pub mod sale;
pub mod withdraw;

/// Acknowledgement of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAck {
    pub batch_id: String,
    pub rows_applied: usize,
}

impl From<BatchReceipt> for BatchAck {
    fn from(receipt: BatchReceipt) -> Self {
        BatchAck {
            batch_id: receipt.batch_id,
            rows_applied: receipt.rows_applied,
        }
    }
}

/// Shared setup for command tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use stockflow_core::{Location, LocationKind, Product, Store};
    use stockflow_db::{Database, DbConfig};

    pub const WAREHOUSE: &str = "W";
    pub const SALES_1: &str = "S1";
    pub const SALES_2: &str = "S2";

    /// In-memory database with one store, W, S1, S2 and products P and Q.
    pub async fn db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        catalog
            .insert_store(&Store {
                id: "store-1".to_string(),
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
                    store_id: "store-1".to_string(),
                    kind,
                    name: id.to_string(),
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

        db
    }
}
