//! # Ledger Engine
//!
//! The only writer of inventory counters and ledger records. Each public
//! operation applies a whole batch of rows inside one SQLite transaction.
//!
//! ## Batch Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Batch, One Transaction                         │
//! │                                                                         │
//! │  submit_sales(&[SaleRowInput])                                         │
//! │       │                                                                 │
//! │       ▼  parse every row (dates, quantities)  ── bad row n ──► Err     │
//! │       │                                                                 │
//! │  apply_sales(&[SaleRow])                                               │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  INSERT ledger_batches ◄── first write, takes the write lock           │
//! │       │                                                                 │
//! │       ▼  for each row, in order:                                       │
//! │  ┌───────────────────────────────────────────────┐                     │
//! │  │ resolve locations (exist, right kind)         │                     │
//! │  │ resolve product, compute amounts from the     │── rule broken ──┐   │
//! │  │   prices visible to this transaction          │                 │   │
//! │  │ decrement / increment counters                │                 │   │
//! │  │ append ledger record(s)                       │                 │   │
//! │  └───────────────────────────────────────────────┘                 │   │
//! │       │                                                            ▼   │
//! │       ▼  COMMIT                                   drop tx ⇒ ROLLBACK   │
//! │  BatchReceipt { batch_id, rows_applied }          Err(Row { n, .. })   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//! - [`Engine::apply_inflows`] - stock received into warehouses
//! - [`Engine::apply_outflows`] - stock leaving warehouses
//! - [`Engine::apply_movements`] - sales area returns and transfers
//! - [`Engine::apply_sales`] - sales area sales
//! - [`Engine::apply_withdrawals`] - cash taken from sales area drawers

mod inflow;
mod movement;
mod outflow;
mod sale;
mod withdraw;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::repository::{catalog, ledger};
use stockflow_core::rows::{check_batch_size, parse_batch, ParseRow};
use stockflow_core::{compute_amounts, Amounts, CoreError, LedgerBatch, LedgerKind, Location, LocationKind, Product};

/// Handle for applying ledger batches.
#[derive(Debug, Clone)]
pub struct Engine {
    pool: SqlitePool,
}

/// What a committed batch produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub batch_id: String,
    pub kind: LedgerKind,
    pub rows_applied: usize,
}

/// An open batch transaction with its header already written.
struct OpenBatch {
    tx: Transaction<'static, Sqlite>,
    header: LedgerBatch,
}

impl Engine {
    /// Creates a new Engine.
    pub fn new(pool: SqlitePool) -> Self {
        Engine { pool }
    }

    /// Starts a batch: size check, BEGIN, header insert.
    async fn begin(&self, kind: LedgerKind, user_id: &str, rows: usize) -> EngineResult<OpenBatch> {
        check_batch_size(rows)?;

        let mut tx = self.pool.begin().await?;

        let header = LedgerBatch {
            id: new_id(),
            kind,
            user_id: user_id.to_string(),
            row_count: rows as i64,
            committed_at: Utc::now(),
        };
        ledger::open_batch(&mut *tx, &header).await?;

        Ok(OpenBatch { tx, header })
    }

    /// Commits the batch and reports it.
    async fn commit(batch: OpenBatch) -> EngineResult<BatchReceipt> {
        let OpenBatch { tx, header } = batch;
        tx.commit().await?;

        info!(
            batch_id = %header.id,
            kind = ?header.kind,
            rows = header.row_count,
            user_id = %header.user_id,
            "Batch committed"
        );

        Ok(BatchReceipt {
            batch_id: header.id,
            kind: header.kind,
            rows_applied: header.row_count as usize,
        })
    }

    /// Parses raw rows, pinning failures to their row number.
    fn parse<I: ParseRow>(kind: LedgerKind, inputs: &[I]) -> EngineResult<Vec<I::Row>> {
        check_batch_size(inputs.len()).map_err(|e| rejected(kind, e.into()))?;
        parse_batch(inputs).map_err(|e| rejected(kind, e.into()))
    }
}

/// Logs a rule rejection and passes the error through.
///
/// Storage failures pass through silently; the command layer logs them
/// at error level.
fn rejected(kind: LedgerKind, err: EngineError) -> EngineError {
    if err.core_error().is_some() {
        warn!(kind = ?kind, error = %err, "Batch rejected");
    }
    err
}

/// Fresh UUID v4 string for batches and records.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Row checks shared by every operation
// =============================================================================

/// Loads a location and checks its kind.
async fn require_location(
    conn: &mut SqliteConnection,
    id: &str,
    expected: LocationKind,
) -> EngineResult<Location> {
    let location = catalog::fetch_location(conn, id)
        .await?
        .ok_or_else(|| CoreError::LocationNotFound(id.to_string()))?;

    if location.kind != expected {
        return Err(CoreError::WrongLocationKind {
            location_id: id.to_string(),
            expected,
        }
        .into());
    }

    Ok(location)
}

/// Values `quantity` units of a product at the prices this transaction sees.
async fn price_row(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> EngineResult<Amounts> {
    let product: Product = catalog::fetch_product(conn, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    Ok(compute_amounts(&product, quantity)?)
}

/// User recorded on the batch header.
fn batch_user<R>(rows: &[R], user_id: impl Fn(&R) -> &str) -> String {
    rows.first().map(user_id).unwrap_or_default().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        inflow, outflow, sale, seed, seeded_db, snapshot, stock, SALES_1, WAREHOUSE,
    };
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use std::io;
    use std::sync::{Arc, Mutex};
    use stockflow_core::rows::SaleRowInput;
    use stockflow_core::{OutflowDestination, PayMethod};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    struct LogWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogWriter;

        fn make_writer(&'a self) -> Self::Writer {
            LogWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for LogWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` under a subscriber that records into a string.
    fn captured_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let db = seeded_db().await;
        let err = db.engine().apply_sales(&[]).await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected(CoreError::EmptyBatch)));
        assert_eq!(db.ledger().counts().await.unwrap().batches, 0);
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let db = seeded_db().await;
        let rows: Vec<_> = (0..=stockflow_core::MAX_BATCH_ROWS)
            .map(|_| inflow(WAREHOUSE, "P", 1))
            .collect();

        let err = db.engine().apply_inflows(&rows).await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected(CoreError::BatchTooLarge { .. })));
        assert_eq!(db.inventory().get_quantity(WAREHOUSE, "P").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_row_rolls_back_whole_batch() {
        let db = seeded_db().await;
        stock(&db, WAREHOUSE, "P", 10).await;
        stock(&db, SALES_1, "P", 4).await;
        let before = snapshot(&db).await;

        let rows = vec![
            outflow(WAREHOUSE, "P", 3, OutflowDestination::Damage),
            outflow(
                WAREHOUSE,
                "P",
                2,
                OutflowDestination::Voucher {
                    sales_area_id: SALES_1.to_string(),
                },
            ),
            // 5 left after the first two rows
            outflow(WAREHOUSE, "P", 6, OutflowDestination::Return),
        ];

        let err = db.engine().apply_outflows(&rows).await.unwrap_err();
        match err {
            EngineError::Row { row, source } => {
                assert_eq!(row, 3);
                assert_eq!(
                    source,
                    CoreError::InsufficientStock {
                        location_id: WAREHOUSE.to_string(),
                        product_id: "P".to_string(),
                        available: 5,
                        requested: 6,
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(snapshot(&db).await, before);
    }

    #[tokio::test]
    async fn test_unparseable_row_reports_row_number() {
        let db = seeded_db().await;
        stock(&db, SALES_1, "P", 10).await;
        let before = snapshot(&db).await;

        let inputs = vec![
            SaleRowInput {
                sales_area_id: SALES_1.to_string(),
                product_id: "P".to_string(),
                quantity: "1".to_string(),
                pay_method: PayMethod::Cash,
                date: "20/02/2024".to_string(),
                user_id: "ana".to_string(),
            },
            SaleRowInput {
                sales_area_id: SALES_1.to_string(),
                product_id: "P".to_string(),
                quantity: "1".to_string(),
                pay_method: PayMethod::Cash,
                date: "31/02/2024".to_string(),
                user_id: "ana".to_string(),
            },
        ];

        let err = db.engine().submit_sales(&inputs).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Row {
                row: 2,
                source: CoreError::InvalidDate { .. }
            }
        ));
        assert_eq!(snapshot(&db).await, before);
    }

    #[tokio::test]
    async fn test_receipt_matches_header() {
        let db = seeded_db().await;
        let receipt = db
            .engine()
            .apply_inflows(&[inflow(WAREHOUSE, "P", 2), inflow(WAREHOUSE, "Q", 3)])
            .await
            .unwrap();

        assert_eq!(receipt.rows_applied, 2);
        assert_eq!(receipt.kind, LedgerKind::Inflow);

        let header = db.ledger().batch(&receipt.batch_id).await.unwrap().unwrap();
        assert_eq!(header.row_count, 2);
        assert_eq!(header.user_id, "ana");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_batches_never_oversell() {
        let path = std::env::temp_dir().join(format!("stockflow-test-{}.db", new_id()));
        let db = Database::new(DbConfig::new(path.clone()).max_connections(8))
            .await
            .unwrap();
        seed(&db).await;
        stock(&db, SALES_1, "P", 5).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = db.engine();
            handles.push(tokio::spawn(async move {
                engine.apply_sales(&[sale(SALES_1, "P", 1, PayMethod::Cash)]).await
            }));
        }

        let mut committed = 0;
        let mut short = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(EngineError::Row {
                    source: CoreError::InsufficientStock { .. },
                    ..
                }) => short += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(committed, 5);
        assert_eq!(short, 5);
        assert_eq!(db.inventory().get_quantity(SALES_1, "P").await.unwrap(), 0);
        assert_eq!(db.ledger().counts().await.unwrap().sales, 5);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[test]
    fn test_storage_failures_not_logged_as_rejections() {
        let logs = captured_logs(|| {
            let err = rejected(
                LedgerKind::Sale,
                EngineError::from(DbError::QueryFailed("disk I/O error".to_string())),
            );
            assert!(matches!(err, EngineError::Storage(_)));
        });
        assert!(logs.is_empty(), "{logs}");

        let logs = captured_logs(|| {
            rejected(LedgerKind::Sale, EngineError::Rejected(CoreError::EmptyBatch));
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Batch rejected"), "{logs}");
    }
}
