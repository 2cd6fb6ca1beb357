//! # Cash Withdrawal Balancer
//!
//! Cash taken out of a sales area's drawer, bounded per (sales area, date)
//! by what cash sales brought in.
//!
//! ## Available Cash
//! ```text
//! available(S, day) = Σ sales.sale_amount  (S, day, pay_method = cash)
//!                   - Σ withdraws.amount   (S, day)
//! ```
//!
//! ## Write, Then Check
//! ```text
//! BEGIN ─► header ─► for each row:
//!                      before = available(S, day)
//!                      append Withdraw(amount)
//!                      after  = available(S, day)
//!                      after < 0 ─► ExcessiveWithdrawal { before, amount,
//!                                                         shortfall: -after }
//!                                   (whole batch rolls back)
//! ```
//! The recomputation runs inside the same transaction that appended the
//! row, after the write lock was taken, so no concurrent batch can spend the
//! same cash.

use chrono::NaiveDate;
use sqlx::SqliteConnection;

use super::{batch_user, rejected, require_location, BatchReceipt, Engine};
use crate::error::EngineResult;
use crate::repository::ledger;
use stockflow_core::rows::{WithdrawRow, WithdrawRowInput};
use stockflow_core::{CoreError, LedgerBatch, LedgerKind, LedgerRecord, LocationKind, Money, WithdrawRecord};

impl Engine {
    /// Cash sales minus withdrawals for a sales area on a date.
    ///
    /// Advisory: a later withdrawal is checked again at commit.
    pub async fn available_cash(&self, sales_area_id: &str, date: NaiveDate) -> EngineResult<Money> {
        let mut conn = self.pool.acquire().await?;
        require_location(&mut conn, sales_area_id, LocationKind::SalesArea).await?;
        available_cash(&mut conn, sales_area_id, date).await
    }

    /// Withdraws a single amount as its own batch.
    pub async fn withdraw(
        &self,
        sales_area_id: &str,
        date: NaiveDate,
        amount: Money,
        user_id: &str,
    ) -> EngineResult<BatchReceipt> {
        let row = WithdrawRow {
            sales_area_id: sales_area_id.to_string(),
            amount,
            date,
            user_id: user_id.to_string(),
        };
        self.apply_withdrawals(&[row]).await
    }

    /// Parses and applies a batch of withdrawal rows.
    pub async fn submit_withdrawals(&self, inputs: &[WithdrawRowInput]) -> EngineResult<BatchReceipt> {
        let rows = Self::parse(LedgerKind::Withdraw, inputs)?;
        self.apply_withdrawals(&rows).await
    }

    /// Applies withdrawal rows in order, all or nothing.
    ///
    /// Rows are cumulative: two rows for the same area and date must fit
    /// together within its available cash.
    pub async fn apply_withdrawals(&self, rows: &[WithdrawRow]) -> EngineResult<BatchReceipt> {
        let kind = LedgerKind::Withdraw;
        let user = batch_user(rows, |r| r.user_id.as_str());

        let mut batch = self
            .begin(kind, &user, rows.len())
            .await
            .map_err(|e| rejected(kind, e))?;

        for (i, row) in rows.iter().enumerate() {
            apply_withdraw(&mut batch.tx, &batch.header, row)
                .await
                .map_err(|e| rejected(kind, e.in_row(i + 1)))?;
        }

        Self::commit(batch).await.map_err(|e| rejected(kind, e))
    }
}

async fn available_cash(conn: &mut SqliteConnection, sales_area_id: &str, date: NaiveDate) -> EngineResult<Money> {
    let sold = ledger::cash_sales_total(conn, sales_area_id, date).await?;
    let withdrawn = ledger::withdrawn_total(conn, sales_area_id, date).await?;
    Ok(sold - withdrawn)
}

async fn apply_withdraw(
    conn: &mut SqliteConnection,
    header: &LedgerBatch,
    row: &WithdrawRow,
) -> EngineResult<()> {
    if !row.amount.is_positive() {
        return Err(CoreError::InvalidAmount {
            value: row.amount.to_string(),
        }
        .into());
    }

    require_location(conn, &row.sales_area_id, LocationKind::SalesArea).await?;

    let before = available_cash(conn, &row.sales_area_id, row.date).await?;

    let record = WithdrawRecord {
        id: super::new_id(),
        batch_id: header.id.clone(),
        sales_area_id: row.sales_area_id.clone(),
        amount: row.amount,
        date: row.date,
        user_id: row.user_id.clone(),
        created_at: header.committed_at,
    };
    ledger::append(conn, &LedgerRecord::Withdraw(record)).await?;

    let after = available_cash(conn, &row.sales_area_id, row.date).await?;
    if after.is_negative() {
        return Err(CoreError::ExcessiveWithdrawal {
            sales_area_id: row.sales_area_id.clone(),
            date: row.date,
            available: before,
            requested: row.amount,
            shortfall: after.abs(),
        }
        .into());
    }

    Ok(())
}
