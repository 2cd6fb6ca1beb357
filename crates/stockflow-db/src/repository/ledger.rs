//! # Ledger Repository
//!
//! Append-only storage of ledger records and batch headers.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Engine transaction                                                    │
//! │                                                                         │
//! │  open_batch(header) ─────► ledger_batches   (first write: takes lock)  │
//! │  append(record) ─────────► inflows | outflows | movements |            │
//! │                            sales | withdraws                           │
//! │                                                                         │
//! │  No UPDATE or DELETE exists here. The database refuses both through    │
//! │  triggers; corrections are new offsetting records.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module never touches inventory counters.
//!
//! ## Polymorphic Columns
//! Tagged enums are stored as a discriminant plus a reference column:
//! ```text
//! InflowSource::Store { store_id }    → source_kind = 'store', source_ref = store_id
//! OutflowDestination::Sale { cash }   → destination_kind = 'sale', pay_method = 'cash'
//! MovementKind::Return { warehouse }  → kind = 'return', destination_id = warehouse
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockflow_core::{
    InflowRecord, InflowSource, LedgerBatch, LedgerRecord, Money, MovementKind, MovementRecord,
    OutflowDestination, OutflowRecord, PayMethod, SaleRecord, WithdrawRecord,
};

/// Repository for reading committed ledger records.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

/// Row totals per ledger table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct LedgerCounts {
    pub batches: i64,
    pub inflows: i64,
    pub outflows: i64,
    pub movements: i64,
    pub sales: i64,
    pub withdraws: i64,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gets a batch header by ID.
    pub async fn batch(&self, id: &str) -> DbResult<Option<LedgerBatch>> {
        let batch = sqlx::query_as::<_, LedgerBatch>(
            "SELECT id, kind, user_id, row_count, committed_at FROM ledger_batches WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Inflows received at a warehouse between two dates (inclusive).
    pub async fn inflows_for(
        &self,
        warehouse_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<InflowRecord>> {
        let rows = sqlx::query_as::<_, InflowRow>(
            r#"
            SELECT id, batch_id, warehouse_id, product_id,
                   source_kind, source_ref, source_movement_id,
                   quantity, cost_amount, sale_amount, date, user_id, created_at
            FROM inflows
            WHERE warehouse_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date, created_at, rowid
            "#,
        )
        .bind(warehouse_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InflowRecord::try_from).collect()
    }

    /// Outflows issued from a warehouse between two dates (inclusive).
    pub async fn outflows_for(
        &self,
        warehouse_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<OutflowRecord>> {
        let rows = sqlx::query_as::<_, OutflowRow>(
            r#"
            SELECT id, batch_id, warehouse_id, product_id,
                   destination_kind, destination_ref, pay_method,
                   quantity, cost_amount, sale_amount, date, user_id, created_at
            FROM outflows
            WHERE warehouse_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date, created_at, rowid
            "#,
        )
        .bind(warehouse_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OutflowRecord::try_from).collect()
    }

    /// Movements leaving a sales area between two dates (inclusive).
    pub async fn movements_for(
        &self,
        sales_area_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<MovementRecord>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, batch_id, sales_area_id, product_id, kind, destination_id,
                   quantity, cost_amount, sale_amount, date, user_id, created_at
            FROM movements
            WHERE sales_area_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date, created_at, rowid
            "#,
        )
        .bind(sales_area_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MovementRecord::try_from).collect()
    }

    /// Sales at a sales area between two dates (inclusive).
    pub async fn sales_for(
        &self,
        sales_area_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, batch_id, sales_area_id, product_id, quantity,
                   cost_amount, sale_amount, pay_method, date, user_id, created_at
            FROM sales
            WHERE sales_area_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date, created_at, rowid
            "#,
        )
        .bind(sales_area_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRecord::try_from).collect()
    }

    /// Cash withdrawals at a sales area between two dates (inclusive).
    pub async fn withdraws_for(
        &self,
        sales_area_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<WithdrawRecord>> {
        let rows = sqlx::query_as::<_, WithdrawRow>(
            r#"
            SELECT id, batch_id, sales_area_id, amount, date, user_id, created_at
            FROM withdraws
            WHERE sales_area_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date, created_at, rowid
            "#,
        )
        .bind(sales_area_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WithdrawRecord::from).collect())
    }

    /// Row totals of every ledger table.
    pub async fn counts(&self) -> DbResult<LedgerCounts> {
        let counts = sqlx::query_as::<_, LedgerCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM ledger_batches) AS batches,
                (SELECT COUNT(*) FROM inflows)        AS inflows,
                (SELECT COUNT(*) FROM outflows)       AS outflows,
                (SELECT COUNT(*) FROM movements)      AS movements,
                (SELECT COUNT(*) FROM sales)          AS sales,
                (SELECT COUNT(*) FROM withdraws)      AS withdraws
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}

// =============================================================================
// Appends (run on the batch transaction)
// =============================================================================

/// Writes a batch header. Must be the first statement of a batch.
pub async fn open_batch(conn: &mut SqliteConnection, batch: &LedgerBatch) -> DbResult<()> {
    debug!(batch_id = %batch.id, kind = ?batch.kind, rows = batch.row_count, "Opening batch");

    sqlx::query(
        r#"
        INSERT INTO ledger_batches (id, kind, user_id, row_count, committed_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&batch.id)
    .bind(batch.kind)
    .bind(&batch.user_id)
    .bind(batch.row_count)
    .bind(batch.committed_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Appends any ledger record to its table.
pub async fn append(conn: &mut SqliteConnection, record: &LedgerRecord) -> DbResult<()> {
    match record {
        LedgerRecord::Inflow(r) => append_inflow(conn, r).await,
        LedgerRecord::Outflow(r) => append_outflow(conn, r).await,
        LedgerRecord::Movement(r) => append_movement(conn, r).await,
        LedgerRecord::Sale(r) => append_sale(conn, r).await,
        LedgerRecord::Withdraw(r) => append_withdraw(conn, r).await,
    }
}

pub async fn append_inflow(conn: &mut SqliteConnection, r: &InflowRecord) -> DbResult<()> {
    debug!(id = %r.id, warehouse_id = %r.warehouse_id, product_id = %r.product_id, "Appending inflow");

    sqlx::query(
        r#"
        INSERT INTO inflows (
            id, batch_id, warehouse_id, product_id,
            source_kind, source_ref, source_movement_id,
            quantity, cost_amount, sale_amount, date, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&r.id)
    .bind(&r.batch_id)
    .bind(&r.warehouse_id)
    .bind(&r.product_id)
    .bind(r.source.kind_str())
    .bind(r.source.reference())
    .bind(r.source.movement_id())
    .bind(r.quantity)
    .bind(r.cost_amount)
    .bind(r.sale_amount)
    .bind(r.date)
    .bind(&r.user_id)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn append_outflow(conn: &mut SqliteConnection, r: &OutflowRecord) -> DbResult<()> {
    debug!(id = %r.id, warehouse_id = %r.warehouse_id, product_id = %r.product_id, "Appending outflow");

    sqlx::query(
        r#"
        INSERT INTO outflows (
            id, batch_id, warehouse_id, product_id,
            destination_kind, destination_ref, pay_method,
            quantity, cost_amount, sale_amount, date, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&r.id)
    .bind(&r.batch_id)
    .bind(&r.warehouse_id)
    .bind(&r.product_id)
    .bind(r.destination.kind_str())
    .bind(r.destination.reference())
    .bind(r.destination.pay_method())
    .bind(r.quantity)
    .bind(r.cost_amount)
    .bind(r.sale_amount)
    .bind(r.date)
    .bind(&r.user_id)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn append_movement(conn: &mut SqliteConnection, r: &MovementRecord) -> DbResult<()> {
    debug!(id = %r.id, sales_area_id = %r.sales_area_id, product_id = %r.product_id, "Appending movement");

    sqlx::query(
        r#"
        INSERT INTO movements (
            id, batch_id, sales_area_id, product_id, kind, destination_id,
            quantity, cost_amount, sale_amount, date, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&r.id)
    .bind(&r.batch_id)
    .bind(&r.sales_area_id)
    .bind(&r.product_id)
    .bind(r.kind.kind_str())
    .bind(r.kind.destination_id())
    .bind(r.quantity)
    .bind(r.cost_amount)
    .bind(r.sale_amount)
    .bind(r.date)
    .bind(&r.user_id)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn append_sale(conn: &mut SqliteConnection, r: &SaleRecord) -> DbResult<()> {
    debug!(id = %r.id, sales_area_id = %r.sales_area_id, product_id = %r.product_id, "Appending sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, batch_id, sales_area_id, product_id, quantity,
            cost_amount, sale_amount, pay_method, date, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&r.id)
    .bind(&r.batch_id)
    .bind(&r.sales_area_id)
    .bind(&r.product_id)
    .bind(r.quantity)
    .bind(r.cost_amount)
    .bind(r.sale_amount)
    .bind(r.pay_method)
    .bind(r.date)
    .bind(&r.user_id)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn append_withdraw(conn: &mut SqliteConnection, r: &WithdrawRecord) -> DbResult<()> {
    debug!(id = %r.id, sales_area_id = %r.sales_area_id, amount = %r.amount, "Appending withdrawal");

    sqlx::query(
        r#"
        INSERT INTO withdraws (id, batch_id, sales_area_id, amount, date, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&r.id)
    .bind(&r.batch_id)
    .bind(&r.sales_area_id)
    .bind(r.amount)
    .bind(r.date)
    .bind(&r.user_id)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Cash sums
// =============================================================================

/// Sum of `sale_amount` over cash sales at a sales area on a date.
pub async fn cash_sales_total(
    conn: &mut SqliteConnection,
    sales_area_id: &str,
    date: NaiveDate,
) -> DbResult<Money> {
    let cents: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(sale_amount), 0)
        FROM sales
        WHERE sales_area_id = ?1 AND date = ?2 AND pay_method = ?3
        "#,
    )
    .bind(sales_area_id)
    .bind(date)
    .bind(PayMethod::Cash)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Money::from_cents(cents))
}

/// Sum of withdrawals at a sales area on a date.
pub async fn withdrawn_total(
    conn: &mut SqliteConnection,
    sales_area_id: &str,
    date: NaiveDate,
) -> DbResult<Money> {
    let cents: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM withdraws WHERE sales_area_id = ?1 AND date = ?2",
    )
    .bind(sales_area_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Money::from_cents(cents))
}

// =============================================================================
// Storage rows
// =============================================================================

#[derive(Debug, FromRow)]
struct InflowRow {
    id: String,
    batch_id: String,
    warehouse_id: String,
    product_id: String,
    source_kind: String,
    source_ref: String,
    source_movement_id: Option<String>,
    quantity: i64,
    cost_amount: Money,
    sale_amount: Money,
    date: NaiveDate,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InflowRow> for InflowRecord {
    type Error = DbError;

    fn try_from(row: InflowRow) -> Result<Self, Self::Error> {
        let source = InflowSource::from_parts(&row.source_kind, row.source_ref, row.source_movement_id)
            .ok_or_else(|| DbError::corrupt("inflow", &row.id, format!("source kind '{}'", row.source_kind)))?;

        Ok(InflowRecord {
            id: row.id,
            batch_id: row.batch_id,
            warehouse_id: row.warehouse_id,
            product_id: row.product_id,
            source,
            quantity: row.quantity,
            cost_amount: row.cost_amount,
            sale_amount: row.sale_amount,
            date: row.date,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OutflowRow {
    id: String,
    batch_id: String,
    warehouse_id: String,
    product_id: String,
    destination_kind: String,
    destination_ref: Option<String>,
    pay_method: Option<PayMethod>,
    quantity: i64,
    cost_amount: Money,
    sale_amount: Money,
    date: NaiveDate,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OutflowRow> for OutflowRecord {
    type Error = DbError;

    fn try_from(row: OutflowRow) -> Result<Self, Self::Error> {
        let destination =
            OutflowDestination::from_parts(&row.destination_kind, row.destination_ref, row.pay_method)
                .ok_or_else(|| {
                    DbError::corrupt(
                        "outflow",
                        &row.id,
                        format!("destination kind '{}'", row.destination_kind),
                    )
                })?;

        Ok(OutflowRecord {
            id: row.id,
            batch_id: row.batch_id,
            warehouse_id: row.warehouse_id,
            product_id: row.product_id,
            destination,
            quantity: row.quantity,
            cost_amount: row.cost_amount,
            sale_amount: row.sale_amount,
            date: row.date,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: String,
    batch_id: String,
    sales_area_id: String,
    product_id: String,
    kind: String,
    destination_id: String,
    quantity: i64,
    cost_amount: Money,
    sale_amount: Money,
    date: NaiveDate,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for MovementRecord {
    type Error = DbError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = MovementKind::from_parts(&row.kind, row.destination_id)
            .ok_or_else(|| DbError::corrupt("movement", &row.id, format!("kind '{}'", row.kind)))?;

        Ok(MovementRecord {
            id: row.id,
            batch_id: row.batch_id,
            sales_area_id: row.sales_area_id,
            product_id: row.product_id,
            kind,
            quantity: row.quantity,
            cost_amount: row.cost_amount,
            sale_amount: row.sale_amount,
            date: row.date,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    batch_id: String,
    sales_area_id: String,
    product_id: String,
    quantity: i64,
    cost_amount: Money,
    sale_amount: Money,
    pay_method: PayMethod,
    date: NaiveDate,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for SaleRecord {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        Ok(SaleRecord {
            id: row.id,
            batch_id: row.batch_id,
            sales_area_id: row.sales_area_id,
            product_id: row.product_id,
            quantity: row.quantity,
            cost_amount: row.cost_amount,
            sale_amount: row.sale_amount,
            pay_method: row.pay_method,
            date: row.date,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct WithdrawRow {
    id: String,
    batch_id: String,
    sales_area_id: String,
    amount: Money,
    date: NaiveDate,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl From<WithdrawRow> for WithdrawRecord {
    fn from(row: WithdrawRow) -> Self {
        WithdrawRecord {
            id: row.id,
            batch_id: row.batch_id,
            sales_area_id: row.sales_area_id,
            amount: row.amount,
            date: row.date,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, seeded_db, SALES_1};
    use stockflow_core::LedgerKind;

    fn header(id: &str, kind: LedgerKind) -> LedgerBatch {
        LedgerBatch {
            id: id.to_string(),
            kind,
            user_id: "ana".to_string(),
            row_count: 1,
            committed_at: Utc::now(),
        }
    }

    fn withdraw(id: &str, batch_id: &str, cents: i64) -> WithdrawRecord {
        WithdrawRecord {
            id: id.to_string(),
            batch_id: batch_id.to_string(),
            sales_area_id: SALES_1.to_string(),
            amount: Money::from_cents(cents),
            date: date("2024-02-20"),
            user_id: "ana".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        open_batch(&mut conn, &header("b-1", LedgerKind::Withdraw)).await.unwrap();
        append(&mut conn, &LedgerRecord::Withdraw(withdraw("w-1", "b-1", 3000)))
            .await
            .unwrap();

        assert_eq!(
            withdrawn_total(&mut conn, SALES_1, date("2024-02-20")).await.unwrap(),
            Money::from_cents(3000)
        );
        assert_eq!(
            withdrawn_total(&mut conn, SALES_1, date("2024-02-21")).await.unwrap(),
            Money::zero()
        );
        drop(conn);

        let records = db
            .ledger()
            .withdraws_for(SALES_1, date("2024-02-01"), date("2024-02-29"))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Money::from_cents(3000));

        let batch = db.ledger().batch("b-1").await.unwrap().unwrap();
        assert_eq!(batch.kind, LedgerKind::Withdraw);
    }

    #[tokio::test]
    async fn test_records_cannot_be_updated_or_deleted() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        open_batch(&mut conn, &header("b-1", LedgerKind::Withdraw)).await.unwrap();
        append_withdraw(&mut conn, &withdraw("w-1", "b-1", 500)).await.unwrap();

        let update = sqlx::query("UPDATE withdraws SET amount = 1 WHERE id = 'w-1'")
            .execute(&mut *conn)
            .await;
        let err: DbError = update.unwrap_err().into();
        assert!(err.to_string().contains("ledger records are immutable"));

        let delete = sqlx::query("DELETE FROM ledger_batches WHERE id = 'b-1'")
            .execute(&mut *conn)
            .await;
        assert!(delete.is_err());
        drop(conn);

        let counts = db.ledger().counts().await.unwrap();
        assert_eq!(counts.batches, 1);
        assert_eq!(counts.withdraws, 1);
    }

    #[tokio::test]
    async fn test_record_needs_existing_batch() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = append_withdraw(&mut conn, &withdraw("w-1", "missing", 500))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
