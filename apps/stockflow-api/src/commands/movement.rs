//! # Movement Commands
//!
//! Stock leaving a sales area: back to a warehouse ("DEVOLUCION") or
//! sideways to another sales area ("TRASLADO").

use std::time::Instant;
use tracing::{debug, info};

use super::BatchAck;
use crate::error::ApiError;
use stockflow_core::rows::MovementRowInput;
use stockflow_db::Database;

/// Parses and commits a batch of movement rows.
pub async fn submit_movements(db: &Database, rows: Vec<MovementRowInput>) -> Result<BatchAck, ApiError> {
    let start = Instant::now();
    debug!(rows = rows.len(), "submit_movements command");

    let receipt = db.engine().submit_movements(&rows).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        batch_id = %receipt.batch_id,
        rows = receipt.rows_applied,
        "submit_movements complete"
    );

    Ok(receipt.into())
}
