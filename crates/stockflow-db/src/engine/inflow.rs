//! Inflows: stock received into a warehouse.
//!
//! ```text
//! Company(provider) ─┐
//! Store(store id)  ──┼──► Warehouse  (+quantity)
//! Return(area)     ──┘
//! ```

use sqlx::SqliteConnection;

use super::{batch_user, price_row, rejected, require_location, BatchReceipt, Engine};
use crate::error::EngineResult;
use crate::repository::{inventory, ledger};
use stockflow_core::rows::{InflowRow, InflowRowInput};
use stockflow_core::{InflowRecord, InflowSource, LedgerBatch, LedgerKind, LedgerRecord, LocationKind};

impl Engine {
    /// Parses and applies a batch of inflow rows.
    pub async fn submit_inflows(&self, inputs: &[InflowRowInput]) -> EngineResult<BatchReceipt> {
        let rows = Self::parse(LedgerKind::Inflow, inputs)?;
        self.apply_inflows(&rows).await
    }

    /// Applies inflow rows in order, all or nothing.
    ///
    /// ## Per Row
    /// 1. Warehouse exists; a `Return` source names an existing sales area
    /// 2. Amounts from the product's current prices
    /// 3. Append the Inflow record, increment the warehouse counter
    ///
    /// `Store` sources are counterpart stores outside this ledger and are not
    /// looked up. A `Return` source never carries a movement link here.
    pub async fn apply_inflows(&self, rows: &[InflowRow]) -> EngineResult<BatchReceipt> {
        let kind = LedgerKind::Inflow;
        let user = batch_user(rows, |r| r.user_id.as_str());

        let mut batch = self
            .begin(kind, &user, rows.len())
            .await
            .map_err(|e| rejected(kind, e))?;

        for (i, row) in rows.iter().enumerate() {
            apply_inflow(&mut batch.tx, &batch.header, row)
                .await
                .map_err(|e| rejected(kind, e.in_row(i + 1)))?;
        }

        Self::commit(batch).await.map_err(|e| rejected(kind, e))
    }
}

async fn apply_inflow(
    conn: &mut SqliteConnection,
    header: &LedgerBatch,
    row: &InflowRow,
) -> EngineResult<()> {
    require_location(conn, &row.warehouse_id, LocationKind::Warehouse).await?;

    // Only a DEVOLUCION movement links its synthetic inflow to itself.
    let source = match &row.source {
        InflowSource::Return { sales_area_id, .. } => {
            require_location(conn, sales_area_id, LocationKind::SalesArea).await?;
            InflowSource::Return {
                sales_area_id: sales_area_id.clone(),
                movement_id: None,
            }
        }
        other => other.clone(),
    };

    let amounts = price_row(conn, &row.product_id, row.quantity).await?;

    let record = InflowRecord {
        id: super::new_id(),
        batch_id: header.id.clone(),
        warehouse_id: row.warehouse_id.clone(),
        product_id: row.product_id.clone(),
        source,
        quantity: row.quantity,
        cost_amount: amounts.cost_amount,
        sale_amount: amounts.sale_amount,
        date: row.date,
        user_id: row.user_id.clone(),
        created_at: header.committed_at,
    };
    ledger::append(conn, &LedgerRecord::Inflow(record)).await?;

    inventory::increment(conn, &row.warehouse_id, &row.product_id, row.quantity).await?;

    Ok(())
}
