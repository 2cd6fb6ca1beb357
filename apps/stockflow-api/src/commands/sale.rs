//! # Sale Commands
//!
//! Stock sold from a sales area. Amounts are priced at commit from the
//! catalog, never taken from the caller.

use std::time::Instant;
use tracing::{debug, info};

use super::BatchAck;
use crate::error::ApiError;
use stockflow_core::rows::SaleRowInput;
use stockflow_db::Database;

/// Parses and commits a batch of sale rows.
pub async fn submit_sales(db: &Database, rows: Vec<SaleRowInput>) -> Result<BatchAck, ApiError> {
    let start = Instant::now();
    debug!(rows = rows.len(), "submit_sales command");

    let receipt = db.engine().submit_sales(&rows).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        batch_id = %receipt.batch_id,
        rows = receipt.rows_applied,
        "submit_sales complete"
    );

    Ok(receipt.into())
}
