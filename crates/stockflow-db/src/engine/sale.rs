//! Sales from a sales area.

use sqlx::SqliteConnection;

use super::{batch_user, price_row, rejected, require_location, BatchReceipt, Engine};
use crate::error::EngineResult;
use crate::repository::{inventory, ledger};
use stockflow_core::rows::{SaleRow, SaleRowInput};
use stockflow_core::{LedgerBatch, LedgerKind, LedgerRecord, LocationKind, SaleRecord};

impl Engine {
    /// Parses and applies a batch of sale rows.
    pub async fn submit_sales(&self, inputs: &[SaleRowInput]) -> EngineResult<BatchReceipt> {
        let rows = Self::parse(LedgerKind::Sale, inputs)?;
        self.apply_sales(&rows).await
    }

    /// Applies sale rows in order, all or nothing.
    ///
    /// Amounts are `quantity x` the product's prices as read inside the batch
    /// transaction.
    pub async fn apply_sales(&self, rows: &[SaleRow]) -> EngineResult<BatchReceipt> {
        let kind = LedgerKind::Sale;
        let user = batch_user(rows, |r| r.user_id.as_str());

        let mut batch = self
            .begin(kind, &user, rows.len())
            .await
            .map_err(|e| rejected(kind, e))?;

        for (i, row) in rows.iter().enumerate() {
            apply_sale(&mut batch.tx, &batch.header, row)
                .await
                .map_err(|e| rejected(kind, e.in_row(i + 1)))?;
        }

        Self::commit(batch).await.map_err(|e| rejected(kind, e))
    }
}

async fn apply_sale(conn: &mut SqliteConnection, header: &LedgerBatch, row: &SaleRow) -> EngineResult<()> {
    require_location(conn, &row.sales_area_id, LocationKind::SalesArea).await?;

    let amounts = price_row(conn, &row.product_id, row.quantity).await?;

    inventory::decrement(conn, &row.sales_area_id, &row.product_id, row.quantity).await?;

    let record = SaleRecord {
        id: super::new_id(),
        batch_id: header.id.clone(),
        sales_area_id: row.sales_area_id.clone(),
        product_id: row.product_id.clone(),
        quantity: row.quantity,
        cost_amount: amounts.cost_amount,
        sale_amount: amounts.sale_amount,
        pay_method: row.pay_method,
        date: row.date,
        user_id: row.user_id.clone(),
        created_at: header.committed_at,
    };
    ledger::append(conn, &LedgerRecord::Sale(record)).await?;

    Ok(())
}
