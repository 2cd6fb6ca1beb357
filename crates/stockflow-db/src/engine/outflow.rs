//! Outflows: stock leaving a warehouse.
//!
//! ```text
//!              ┌──► StoreTransfer(store)   counterpart store records its own inflow
//!              ├──► Voucher(area) "VALE"   +quantity at the sales area
//! Warehouse ───┼──► Sale(pay method)
//! (-quantity)  ├──► Return (to provider)
//!              └──► Damage
//! ```

use sqlx::SqliteConnection;

use super::{batch_user, price_row, rejected, require_location, BatchReceipt, Engine};
use crate::error::EngineResult;
use crate::repository::{inventory, ledger};
use stockflow_core::rows::{OutflowRow, OutflowRowInput};
use stockflow_core::{LedgerBatch, LedgerKind, LedgerRecord, LocationKind, OutflowDestination, OutflowRecord};

impl Engine {
    /// Parses and applies a batch of outflow rows.
    pub async fn submit_outflows(&self, inputs: &[OutflowRowInput]) -> EngineResult<BatchReceipt> {
        let rows = Self::parse(LedgerKind::Outflow, inputs)?;
        self.apply_outflows(&rows).await
    }

    /// Applies outflow rows in order, all or nothing.
    ///
    /// Later rows see the counters as left by earlier rows of the same batch.
    pub async fn apply_outflows(&self, rows: &[OutflowRow]) -> EngineResult<BatchReceipt> {
        let kind = LedgerKind::Outflow;
        let user = batch_user(rows, |r| r.user_id.as_str());

        let mut batch = self
            .begin(kind, &user, rows.len())
            .await
            .map_err(|e| rejected(kind, e))?;

        for (i, row) in rows.iter().enumerate() {
            apply_outflow(&mut batch.tx, &batch.header, row)
                .await
                .map_err(|e| rejected(kind, e.in_row(i + 1)))?;
        }

        Self::commit(batch).await.map_err(|e| rejected(kind, e))
    }
}

async fn apply_outflow(
    conn: &mut SqliteConnection,
    header: &LedgerBatch,
    row: &OutflowRow,
) -> EngineResult<()> {
    require_location(conn, &row.warehouse_id, LocationKind::Warehouse).await?;

    if let OutflowDestination::Voucher { sales_area_id } = &row.destination {
        require_location(conn, sales_area_id, LocationKind::SalesArea).await?;
    }

    let amounts = price_row(conn, &row.product_id, row.quantity).await?;

    inventory::decrement(conn, &row.warehouse_id, &row.product_id, row.quantity).await?;

    let record = OutflowRecord {
        id: super::new_id(),
        batch_id: header.id.clone(),
        warehouse_id: row.warehouse_id.clone(),
        product_id: row.product_id.clone(),
        destination: row.destination.clone(),
        quantity: row.quantity,
        cost_amount: amounts.cost_amount,
        sale_amount: amounts.sale_amount,
        date: row.date,
        user_id: row.user_id.clone(),
        created_at: header.committed_at,
    };
    ledger::append(conn, &LedgerRecord::Outflow(record)).await?;

    if let OutflowDestination::Voucher { sales_area_id } = &row.destination {
        inventory::increment(conn, sales_area_id, &row.product_id, row.quantity).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::EngineError;
    use crate::testing::{date, outflow, seeded_db, snapshot, stock, SALES_1, WAREHOUSE};
    use stockflow_core::{CoreError, LocationKind, OutflowDestination, PayMethod};

    #[tokio::test]
    async fn test_outflow_beyond_stock_changes_nothing() {
        let db = seeded_db().await;
        stock(&db, WAREHOUSE, "P", 10).await;
        let before = snapshot(&db).await;

        let err = db
            .engine()
            .apply_outflows(&[outflow(
                WAREHOUSE,
                "P",
                15,
                OutflowDestination::Sale {
                    pay_method: PayMethod::Cash,
                },
            )])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Row {
                row: 1,
                source: CoreError::InsufficientStock {
                    available: 10,
                    requested: 15,
                    ..
                }
            }
        ));
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 10);
        assert_eq!(snapshot(&db).await, before);
    }

    #[tokio::test]
    async fn test_voucher_moves_stock_to_sales_area() {
        let db = seeded_db().await;
        stock(&db, WAREHOUSE, "P", 10).await;

        db.engine()
            .apply_outflows(&[outflow(
                WAREHOUSE,
                "P",
                4,
                OutflowDestination::Voucher {
                    sales_area_id: SALES_1.to_string(),
                },
            )])
            .await
            .unwrap();

        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 6);
        assert_eq!(db.inventory().get_quantity(SALES_1, "P").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_terminal_destinations_only_decrement() {
        let db = seeded_db().await;
        stock(&db, WAREHOUSE, "P", 10).await;

        let rows = vec![
            outflow(
                WAREHOUSE,
                "P",
                1,
                OutflowDestination::StoreTransfer {
                    store_id: "other-store".to_string(),
                },
            ),
            outflow(WAREHOUSE, "P", 2, OutflowDestination::Return),
            outflow(WAREHOUSE, "P", 3, OutflowDestination::Damage),
            outflow(
                WAREHOUSE,
                "P",
                1,
                OutflowDestination::Sale {
                    pay_method: PayMethod::Card,
                },
            ),
        ];
        db.engine().apply_outflows(&rows).await.unwrap();

        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 3);
        assert_eq!(db.inventory().get_quantity(SALES_1, "P").await.unwrap(), 0);

        let records = db
            .ledger()
            .outflows_for(WAREHOUSE, date("2024-02-20"), date("2024-02-20"))
            .await
            .unwrap();
        let destinations: Vec<_> = records.iter().map(|r| r.destination.clone()).collect();
        assert_eq!(destinations, rows.into_iter().map(|r| r.destination).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_voucher_to_warehouse_rejected() {
        let db = seeded_db().await;
        stock(&db, WAREHOUSE, "P", 10).await;

        let err = db
            .engine()
            .apply_outflows(&[outflow(
                WAREHOUSE,
                "P",
                1,
                OutflowDestination::Voucher {
                    sales_area_id: WAREHOUSE.to_string(),
                },
            )])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Row {
                source: CoreError::WrongLocationKind {
                    expected: LocationKind::SalesArea,
                    ..
                },
                ..
            }
        ));
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 10);
    }
}
