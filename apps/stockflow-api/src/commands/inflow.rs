//! # Inflow Commands
//!
//! Stock arriving at a warehouse from a provider, another store, or a
//! returning sales area.

use std::time::Instant;
use tracing::{debug, info};

use super::BatchAck;
use crate::error::ApiError;
use stockflow_core::rows::InflowRowInput;
use stockflow_db::Database;

/// Parses and commits a batch of inflow rows.
///
/// ## Returns
/// The committed batch id, or the first failing row's error. Nothing is
/// written on error.
pub async fn submit_inflows(db: &Database, rows: Vec<InflowRowInput>) -> Result<BatchAck, ApiError> {
    let start = Instant::now();
    debug!(rows = rows.len(), "submit_inflows command");

    let receipt = db.engine().submit_inflows(&rows).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        batch_id = %receipt.batch_id,
        rows = receipt.rows_applied,
        "submit_inflows complete"
    );

    Ok(receipt.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{db, SALES_1, WAREHOUSE};
    use crate::error::ErrorCode;
    use stockflow_core::InflowSource;

    fn row(location: &str, quantity: &str) -> InflowRowInput {
        InflowRowInput {
            warehouse_id: location.to_string(),
            product_id: "P".to_string(),
            quantity: quantity.to_string(),
            source: InflowSource::Company {
                provider: "Acme Foods".to_string(),
            },
            date: "20/02/2024".to_string(),
            user_id: "ana".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_inflows_acknowledges_batch() {
        let db = db().await;

        let ack = submit_inflows(&db, vec![row(WAREHOUSE, "50")]).await.unwrap();

        assert_eq!(ack.rows_applied, 1);
        assert!(!ack.batch_id.is_empty());
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_submit_inflows_reports_bad_row() {
        let db = db().await;

        let err = submit_inflows(&db, vec![row(WAREHOUSE, "5"), row(WAREHOUSE, "five")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.starts_with("Row 2:"), "{}", err.message);

        let err = submit_inflows(&db, vec![row(SALES_1, "5")]).await.unwrap_err();
        assert_eq!(err.status, 422);

        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 0);
    }
}
