//! # Cash Withdrawal Commands
//!
//! ```text
//! available_cash(S1, 20/02/2024) ──► "70.00"      (advisory, for the form)
//!          │
//!          ▼
//! submit_withdrawals([{ S1, "80.00", ... }])
//!          │
//!          ▼
//! re-checked at commit ──► 422 EXCESSIVE_WITHDRAWAL "... short by 10.00"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::BatchAck;
use crate::error::ApiError;
use stockflow_core::rows::WithdrawRowInput;
use stockflow_core::validation::parse_date;
use stockflow_core::Money;
use stockflow_db::Database;

/// Cash available for withdrawal at a sales area on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCashDto {
    pub sales_area_id: String,
    /// ISO date
    pub date: String,
    pub available_cents: i64,
    /// Formatted with two decimals
    pub available: String,
}

/// Parses and commits a batch of withdrawal rows.
///
/// Rows for the same sales area and date are cumulative.
pub async fn submit_withdrawals(
    db: &Database,
    rows: Vec<WithdrawRowInput>,
) -> Result<BatchAck, ApiError> {
    let start = Instant::now();
    debug!(rows = rows.len(), "submit_withdrawals command");

    let receipt = db.engine().submit_withdrawals(&rows).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        batch_id = %receipt.batch_id,
        rows = receipt.rows_applied,
        "submit_withdrawals complete"
    );

    Ok(receipt.into())
}

/// Cash sales minus withdrawals for `sales_area_id` on `date`.
///
/// ## Arguments
/// * `date` - "DD/MM/YYYY" or "YYYY-MM-DD"
pub async fn available_cash(
    db: &Database,
    sales_area_id: &str,
    date: &str,
) -> Result<AvailableCashDto, ApiError> {
    debug!(sales_area_id = %sales_area_id, date = %date, "available_cash command");

    let day = parse_date(date)?;
    let available: Money = db.engine().available_cash(sales_area_id, day).await?;

    Ok(AvailableCashDto {
        sales_area_id: sales_area_id.to_string(),
        date: day.to_string(),
        available_cents: available.cents(),
        available: available.to_string(),
    })
}
