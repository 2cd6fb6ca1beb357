//! # Batch Rows
//!
//! The row shapes a UI submits (`*RowInput`, every field as typed into the
//! form) and their parsed, validated counterparts (`*Row`) the engine
//! applies.
//!
//! ## Parse Before Touching Storage
//! ```text
//! [InflowRowInput, InflowRowInput, ...]
//!        │
//!        ▼  parse_batch()  ── any bad date/quantity ──► RowError { row: n }
//!        │                                               (nothing written)
//!        ▼
//! [InflowRow, InflowRow, ...] ──► engine::apply_inflows()
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{InflowSource, MovementKind, OutflowDestination, PayMethod};
use crate::validation::{parse_date, parse_positive_amount, parse_quantity, validate_id, validate_name};
use crate::MAX_BATCH_ROWS;

// =============================================================================
// Row errors
// =============================================================================

/// A rule violation on one row of a batch. `row` is 1-based, as shown in the
/// UI table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: {error}")]
pub struct RowError {
    pub row: usize,
    pub error: CoreError,
}

/// A raw row that can be parsed into its validated form.
pub trait ParseRow {
    type Row;

    fn parse(&self) -> CoreResult<Self::Row>;
}

/// Rejects empty and oversized batches.
pub fn check_batch_size(len: usize) -> CoreResult<()> {
    if len == 0 {
        return Err(CoreError::EmptyBatch);
    }
    if len > MAX_BATCH_ROWS {
        return Err(CoreError::BatchTooLarge {
            max: MAX_BATCH_ROWS,
        });
    }
    Ok(())
}

/// Parses every row, stopping at the first invalid one.
pub fn parse_batch<I: ParseRow>(inputs: &[I]) -> Result<Vec<I::Row>, RowError> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| input.parse().map_err(|error| RowError { row: i + 1, error }))
        .collect()
}

fn id(field: &str, value: &str) -> CoreResult<String> {
    Ok(validate_id(field, value)?)
}

// =============================================================================
// Inflow
// =============================================================================

/// Inflow row as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InflowRowInput {
    pub warehouse_id: String,
    pub product_id: String,
    pub quantity: String,
    pub source: InflowSource,
    pub date: String,
    pub user_id: String,
}

/// Validated inflow row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflowRow {
    pub warehouse_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub source: InflowSource,
    pub date: NaiveDate,
    pub user_id: String,
}

impl ParseRow for InflowRowInput {
    type Row = InflowRow;

    fn parse(&self) -> CoreResult<InflowRow> {
        let date = parse_date(&self.date)?;
        let quantity = parse_quantity(&self.quantity)?;

        let source = match &self.source {
            InflowSource::Company { provider } => InflowSource::Company {
                provider: validate_name("provider", provider)?,
            },
            InflowSource::Store { store_id } => InflowSource::Store {
                store_id: id("store", store_id)?,
            },
            InflowSource::Return { sales_area_id, .. } => InflowSource::Return {
                sales_area_id: id("sales area", sales_area_id)?,
                movement_id: None,
            },
        };

        Ok(InflowRow {
            warehouse_id: id("warehouse", &self.warehouse_id)?,
            product_id: id("product", &self.product_id)?,
            quantity,
            source,
            date,
            user_id: id("user", &self.user_id)?,
        })
    }
}

// =============================================================================
// Outflow
// =============================================================================

/// Outflow row as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutflowRowInput {
    pub warehouse_id: String,
    pub product_id: String,
    pub quantity: String,
    pub destination: OutflowDestination,
    pub date: String,
    pub user_id: String,
}

/// Validated outflow row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutflowRow {
    pub warehouse_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub destination: OutflowDestination,
    pub date: NaiveDate,
    pub user_id: String,
}

impl ParseRow for OutflowRowInput {
    type Row = OutflowRow;

    fn parse(&self) -> CoreResult<OutflowRow> {
        let date = parse_date(&self.date)?;
        let quantity = parse_quantity(&self.quantity)?;

        let destination = match &self.destination {
            OutflowDestination::StoreTransfer { store_id } => OutflowDestination::StoreTransfer {
                store_id: id("store", store_id)?,
            },
            OutflowDestination::Voucher { sales_area_id } => OutflowDestination::Voucher {
                sales_area_id: id("sales area", sales_area_id)?,
            },
            other => other.clone(),
        };

        Ok(OutflowRow {
            warehouse_id: id("warehouse", &self.warehouse_id)?,
            product_id: id("product", &self.product_id)?,
            quantity,
            destination,
            date,
            user_id: id("user", &self.user_id)?,
        })
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Movement row as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementRowInput {
    pub sales_area_id: String,
    pub product_id: String,
    pub quantity: String,
    pub kind: MovementKind,
    pub date: String,
    pub user_id: String,
}

/// Validated movement row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRow {
    pub sales_area_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub kind: MovementKind,
    pub date: NaiveDate,
    pub user_id: String,
}

impl ParseRow for MovementRowInput {
    type Row = MovementRow;

    fn parse(&self) -> CoreResult<MovementRow> {
        let date = parse_date(&self.date)?;
        let quantity = parse_quantity(&self.quantity)?;
        let sales_area_id = id("sales area", &self.sales_area_id)?;

        let kind = match &self.kind {
            MovementKind::Return { warehouse_id } => MovementKind::Return {
                warehouse_id: id("warehouse", warehouse_id)?,
            },
            MovementKind::Transfer { sales_area_id: to } => {
                let to = id("sales area", to)?;
                if to == sales_area_id {
                    return Err(CoreError::SameLocation(to));
                }
                MovementKind::Transfer { sales_area_id: to }
            }
        };

        Ok(MovementRow {
            sales_area_id,
            product_id: id("product", &self.product_id)?,
            quantity,
            kind,
            date,
            user_id: id("user", &self.user_id)?,
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Sale row as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRowInput {
    pub sales_area_id: String,
    pub product_id: String,
    pub quantity: String,
    pub pay_method: PayMethod,
    pub date: String,
    pub user_id: String,
}

/// Validated sale row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRow {
    pub sales_area_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub pay_method: PayMethod,
    pub date: NaiveDate,
    pub user_id: String,
}

impl ParseRow for SaleRowInput {
    type Row = SaleRow;

    fn parse(&self) -> CoreResult<SaleRow> {
        Ok(SaleRow {
            date: parse_date(&self.date)?,
            quantity: parse_quantity(&self.quantity)?,
            sales_area_id: id("sales area", &self.sales_area_id)?,
            product_id: id("product", &self.product_id)?,
            pay_method: self.pay_method,
            user_id: id("user", &self.user_id)?,
        })
    }
}

// =============================================================================
// Withdraw
// =============================================================================

/// Cash withdrawal row as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WithdrawRowInput {
    pub sales_area_id: String,
    pub amount: String,
    pub date: String,
    pub user_id: String,
}

/// Validated withdrawal row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawRow {
    pub sales_area_id: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub user_id: String,
}

impl ParseRow for WithdrawRowInput {
    type Row = WithdrawRow;

    fn parse(&self) -> CoreResult<WithdrawRow> {
        Ok(WithdrawRow {
            date: parse_date(&self.date)?,
            amount: parse_positive_amount(&self.amount)?,
            sales_area_id: id("sales area", &self.sales_area_id)?,
            user_id: id("user", &self.user_id)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
