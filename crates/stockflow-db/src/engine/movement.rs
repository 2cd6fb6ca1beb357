//! Movements: stock leaving a sales area.
//!
//! ```text
//!                ┌──► Return "DEVOLUCION"  ──► Warehouse  (+quantity)
//! Sales area ────┤                              + synthetic Inflow(Return)
//! (-quantity)    └──► Transfer "TRASLADO"  ──► Sales area (+quantity)
//! ```
//!
//! A return is one logical operation with two ledger appends: the movement
//! and an inflow at the warehouse whose source links back to it.

use sqlx::SqliteConnection;

use super::{batch_user, price_row, rejected, require_location, BatchReceipt, Engine};
use crate::error::EngineResult;
use crate::repository::{inventory, ledger};
use stockflow_core::rows::{MovementRow, MovementRowInput};
use stockflow_core::{
    CoreError, InflowRecord, InflowSource, LedgerBatch, LedgerKind, LedgerRecord, LocationKind,
    MovementKind, MovementRecord,
};

impl Engine {
    /// Parses and applies a batch of movement rows.
    pub async fn submit_movements(&self, inputs: &[MovementRowInput]) -> EngineResult<BatchReceipt> {
        let rows = Self::parse(LedgerKind::Movement, inputs)?;
        self.apply_movements(&rows).await
    }

    /// Applies movement rows in order, all or nothing.
    pub async fn apply_movements(&self, rows: &[MovementRow]) -> EngineResult<BatchReceipt> {
        let kind = LedgerKind::Movement;
        let user = batch_user(rows, |r| r.user_id.as_str());

        let mut batch = self
            .begin(kind, &user, rows.len())
            .await
            .map_err(|e| rejected(kind, e))?;

        for (i, row) in rows.iter().enumerate() {
            apply_movement(&mut batch.tx, &batch.header, row)
                .await
                .map_err(|e| rejected(kind, e.in_row(i + 1)))?;
        }

        Self::commit(batch).await.map_err(|e| rejected(kind, e))
    }
}

async fn apply_movement(
    conn: &mut SqliteConnection,
    header: &LedgerBatch,
    row: &MovementRow,
) -> EngineResult<()> {
    let destination = row.kind.destination_id();
    if destination == row.sales_area_id {
        return Err(CoreError::SameLocation(row.sales_area_id.clone()).into());
    }

    require_location(conn, &row.sales_area_id, LocationKind::SalesArea).await?;
    require_location(conn, destination, row.kind.destination_kind()).await?;

    let amounts = price_row(conn, &row.product_id, row.quantity).await?;

    inventory::decrement(conn, &row.sales_area_id, &row.product_id, row.quantity).await?;

    let movement = MovementRecord {
        id: super::new_id(),
        batch_id: header.id.clone(),
        sales_area_id: row.sales_area_id.clone(),
        product_id: row.product_id.clone(),
        kind: row.kind.clone(),
        quantity: row.quantity,
        cost_amount: amounts.cost_amount,
        sale_amount: amounts.sale_amount,
        date: row.date,
        user_id: row.user_id.clone(),
        created_at: header.committed_at,
    };
    let movement_id = movement.id.clone();
    ledger::append(conn, &LedgerRecord::Movement(movement)).await?;

    inventory::increment(conn, destination, &row.product_id, row.quantity).await?;

    if let MovementKind::Return { warehouse_id } = &row.kind {
        let inflow = InflowRecord {
            id: super::new_id(),
            batch_id: header.id.clone(),
            warehouse_id: warehouse_id.clone(),
            product_id: row.product_id.clone(),
            source: InflowSource::Return {
                sales_area_id: row.sales_area_id.clone(),
                movement_id: Some(movement_id),
            },
            quantity: row.quantity,
            cost_amount: amounts.cost_amount,
            sale_amount: amounts.sale_amount,
            date: row.date,
            user_id: row.user_id.clone(),
            created_at: header.committed_at,
        };
        ledger::append(conn, &LedgerRecord::Inflow(inflow)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::EngineError;
    use crate::testing::{date, movement, seeded_db, snapshot, stock, SALES_1, SALES_2, WAREHOUSE};
    use stockflow_core::{CoreError, InflowSource, MovementKind};

    fn to_warehouse() -> MovementKind {
        MovementKind::Return {
            warehouse_id: WAREHOUSE.to_string(),
        }
    }

    fn to_sales_2() -> MovementKind {
        MovementKind::Transfer {
            sales_area_id: SALES_2.to_string(),
        }
    }

    #[tokio::test]
    async fn test_return_writes_movement_and_linked_inflow() {
        let db = seeded_db().await;
        stock(&db, SALES_1, "P", 20).await;
        stock(&db, WAREHOUSE, "P", 7).await;

        db.engine()
            .apply_movements(&[movement(SALES_1, "P", 5, to_warehouse())])
            .await
            .unwrap();

        assert_eq!(db.inventory().get_quantity(SALES_1, "P").await.unwrap(), 15);
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 12);

        let day = date("2024-02-20");
        let movements = db.ledger().movements_for(SALES_1, day, day).await.unwrap();
        let inflows = db.ledger().inflows_for(WAREHOUSE, day, day).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(inflows.len(), 1);

        let (m, i) = (&movements[0], &inflows[0]);
        assert_eq!(
            i.source,
            InflowSource::Return {
                sales_area_id: SALES_1.to_string(),
                movement_id: Some(m.id.clone()),
            }
        );
        assert_eq!(i.batch_id, m.batch_id);
        assert_eq!(i.quantity, 5);
        assert_eq!(i.cost_amount, m.cost_amount);
        assert_eq!(i.sale_amount, m.sale_amount);
    }

    #[tokio::test]
    async fn test_transfer_conserves_quantity() {
        let db = seeded_db().await;
        stock(&db, SALES_1, "P", 9).await;
        stock(&db, SALES_2, "P", 1).await;

        db.engine()
            .apply_movements(&[
                movement(SALES_1, "P", 4, to_sales_2()),
                movement(SALES_1, "P", 2, to_sales_2()),
            ])
            .await
            .unwrap();

        let s1 = db.inventory().get_quantity(SALES_1, "P").await.unwrap();
        let s2 = db.inventory().get_quantity(SALES_2, "P").await.unwrap();
        assert_eq!((s1, s2), (3, 7));
        assert_eq!(s1 + s2, 10);

        // Transfers never create inflows
        assert_eq!(db.ledger().counts().await.unwrap().inflows, 0);
    }

    #[tokio::test]
    async fn test_transfer_to_same_area_rejected() {
        let db = seeded_db().await;
        stock(&db, SALES_1, "P", 9).await;

        let kind = MovementKind::Transfer {
            sales_area_id: SALES_1.to_string(),
        };
        let err = db
            .engine()
            .apply_movements(&[movement(SALES_1, "P", 1, kind)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Row {
                row: 1,
                source: CoreError::SameLocation(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_movement_beyond_stock_rolls_back_earlier_rows() {
        let db = seeded_db().await;
        stock(&db, SALES_1, "P", 6).await;
        let before = snapshot(&db).await;

        let err = db
            .engine()
            .apply_movements(&[
                movement(SALES_1, "P", 5, to_warehouse()),
                movement(SALES_1, "P", 2, to_sales_2()),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Row {
                row: 2,
                source: CoreError::InsufficientStock {
                    available: 1,
                    requested: 2,
                    ..
                }
            }
        ));
        assert_eq!(snapshot(&db).await, before);
    }

    #[tokio::test]
    async fn test_return_to_sales_area_rejected() {
        let db = seeded_db().await;
        stock(&db, SALES_1, "P", 6).await;

        let kind = MovementKind::Return {
            warehouse_id: SALES_2.to_string(),
        };
        let err = db
            .engine()
            .apply_movements(&[movement(SALES_1, "P", 1, kind)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Row {
                source: CoreError::WrongLocationKind { .. },
                ..
            }
        ));
        assert_eq!(db.inventory().get_quantity(SALES_1, "P").await.unwrap(), 6);
    }
}
