//! # Outflow Commands
//!
//! Stock leaving a warehouse: to another store, as a voucher to a sales
//! area, as a direct sale, back to the provider, or written off.

use std::time::Instant;
use tracing::{debug, info};

use super::BatchAck;
use crate::error::ApiError;
use stockflow_core::rows::OutflowRowInput;
use stockflow_db::Database;

/// Parses and commits a batch of outflow rows.
pub async fn submit_outflows(db: &Database, rows: Vec<OutflowRowInput>) -> Result<BatchAck, ApiError> {
    let start = Instant::now();
    debug!(rows = rows.len(), "submit_outflows command");

    let receipt = db.engine().submit_outflows(&rows).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        batch_id = %receipt.batch_id,
        rows = receipt.rows_applied,
        "submit_outflows complete"
    );

    Ok(receipt.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{db, SALES_1, WAREHOUSE};
    use crate::commands::inflow::submit_inflows;
    use crate::error::ErrorCode;
    use stockflow_core::rows::InflowRowInput;
    use stockflow_core::{InflowSource, OutflowDestination, PayMethod};

    fn row(quantity: &str, destination: OutflowDestination) -> OutflowRowInput {
        OutflowRowInput {
            warehouse_id: WAREHOUSE.to_string(),
            product_id: "P".to_string(),
            quantity: quantity.to_string(),
            destination,
            date: "2024-02-20".to_string(),
            user_id: "ana".to_string(),
        }
    }

    async fn stocked() -> Database {
        let db = db().await;
        submit_inflows(
            &db,
            vec![InflowRowInput {
                warehouse_id: WAREHOUSE.to_string(),
                product_id: "P".to_string(),
                quantity: "10".to_string(),
                source: InflowSource::Store {
                    store_id: "store-2".to_string(),
                },
                date: "2024-02-20".to_string(),
                user_id: "ana".to_string(),
            }],
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_voucher_moves_stock_to_sales_area() {
        let db = stocked().await;

        let ack = submit_outflows(
            &db,
            vec![row(
                "4",
                OutflowDestination::Voucher {
                    sales_area_id: SALES_1.to_string(),
                },
            )],
        )
        .await
        .unwrap();

        assert_eq!(ack.rows_applied, 1);
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 6);
        assert_eq!(db.inventory().get_quantity(SALES_1, "P").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_conflict() {
        let db = stocked().await;

        let err = submit_outflows(
            &db,
            vec![row(
                "15",
                OutflowDestination::Sale {
                    pay_method: PayMethod::Cash,
                },
            )],
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.status, 409);
        assert!(err.message.contains("available 10, requested 15"));
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 10);
    }
}
