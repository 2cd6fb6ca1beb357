//! # Inventory Repository
//!
//! One stock counter per (location, product).
//!
//! ## Counter Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Atomic Counter Updates                               │
//! │                                                                         │
//! │  increment(W, P, 5)                                                    │
//! │    INSERT .. VALUES (W, P, 5)                                          │
//! │    ON CONFLICT (location_id, product_id)                               │
//! │    DO UPDATE SET quantity = quantity + excluded.quantity               │
//! │    → creates the counter on first arrival                              │
//! │                                                                         │
//! │  decrement(W, P, 15)                                                   │
//! │    UPDATE .. SET quantity = quantity - 15                              │
//! │    WHERE .. AND quantity >= 15                                         │
//! │    → 0 rows affected ⇒ InsufficientStock { available, requested }     │
//! │                                                                         │
//! │  Never read-modify-write: the check and the write are one statement.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutators are free functions over a `SqliteConnection` so the engine
//! can run them on its batch transaction (`&mut *tx`). The repository type
//! wraps the pool for standalone reads.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbResult, EngineError, EngineResult};
use stockflow_core::{CoreError, InventoryRecord, StockLine};

/// Repository for per-location stock counters.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Current quantity; 0 when no counter exists yet.
    pub async fn get_quantity(&self, location_id: &str, product_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        get_quantity(&mut conn, location_id, product_id).await
    }

    /// The full counter, if one exists.
    pub async fn get_record(
        &self,
        location_id: &str,
        product_id: &str,
    ) -> DbResult<Option<InventoryRecord>> {
        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT location_id, product_id, quantity, min_stock
            FROM inventory
            WHERE location_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(location_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Quantity at or below the threshold.
    ///
    /// A missing counter reads as quantity 0 with threshold 0, so it is low.
    pub async fn is_low_stock(&self, location_id: &str, product_id: &str) -> DbResult<bool> {
        let record = self.get_record(location_id, product_id).await?;
        Ok(record.map_or(true, |r| r.is_low_stock()))
    }

    /// Sets the low-stock threshold, creating the counter at quantity 0 if
    /// needed.
    ///
    /// ## Errors
    /// * `DbError::CheckViolation` - negative threshold
    /// * `DbError::ForeignKeyViolation` - unknown location or product
    pub async fn set_min_stock(
        &self,
        location_id: &str,
        product_id: &str,
        min_stock: i64,
    ) -> DbResult<()> {
        debug!(location_id, product_id, min_stock, "Setting min stock");

        sqlx::query(
            r#"
            INSERT INTO inventory (location_id, product_id, quantity, min_stock, updated_at)
            VALUES (?1, ?2, 0, ?3, ?4)
            ON CONFLICT (location_id, product_id)
            DO UPDATE SET min_stock = excluded.min_stock, updated_at = excluded.updated_at
            "#,
        )
        .bind(location_id)
        .bind(product_id)
        .bind(min_stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Products with stock at a location, for pickers.
    pub async fn list_in_stock(&self, location_id: &str) -> DbResult<Vec<StockLine>> {
        let lines = sqlx::query_as::<_, StockLine>(
            r#"
            SELECT
                i.location_id,
                i.product_id,
                p.name AS product_name,
                p.unit,
                i.quantity,
                i.min_stock,
                p.cost_price,
                p.sale_price
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.location_id = ?1 AND i.quantity > 0
            ORDER BY p.name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counters at or below their threshold at a location.
    pub async fn list_low_stock(&self, location_id: &str) -> DbResult<Vec<StockLine>> {
        let lines = sqlx::query_as::<_, StockLine>(
            r#"
            SELECT
                i.location_id,
                i.product_id,
                p.name AS product_name,
                p.unit,
                i.quantity,
                i.min_stock,
                p.cost_price,
                p.sale_price
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.location_id = ?1 AND i.quantity <= i.min_stock
            ORDER BY i.quantity, p.name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}

// =============================================================================
// Counter operations (run on the batch transaction)
// =============================================================================

/// Current quantity on the given connection; 0 when absent.
pub async fn get_quantity(
    conn: &mut SqliteConnection,
    location_id: &str,
    product_id: &str,
) -> DbResult<i64> {
    let quantity: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM inventory WHERE location_id = ?1 AND product_id = ?2",
    )
    .bind(location_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quantity.unwrap_or(0))
}

/// Adds `amount` to the counter, creating it if absent. Returns the new
/// quantity.
pub async fn increment(
    conn: &mut SqliteConnection,
    location_id: &str,
    product_id: &str,
    amount: i64,
) -> DbResult<i64> {
    debug!(location_id, product_id, amount, "Incrementing stock");

    let quantity: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO inventory (location_id, product_id, quantity, min_stock, updated_at)
        VALUES (?1, ?2, ?3, 0, ?4)
        ON CONFLICT (location_id, product_id)
        DO UPDATE SET
            quantity = quantity + excluded.quantity,
            updated_at = excluded.updated_at
        RETURNING quantity
        "#,
    )
    .bind(location_id)
    .bind(product_id)
    .bind(amount)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(quantity)
}

/// Removes `amount` from the counter. Returns the new quantity.
///
/// ## Errors
/// * `EngineError::Rejected(CoreError::InsufficientStock)` - fewer than
///   `amount` units on hand (including no counter at all); nothing changes
pub async fn decrement(
    conn: &mut SqliteConnection,
    location_id: &str,
    product_id: &str,
    amount: i64,
) -> EngineResult<i64> {
    debug!(location_id, product_id, amount, "Decrementing stock");

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory
        SET quantity = quantity - ?3, updated_at = ?4
        WHERE location_id = ?1 AND product_id = ?2 AND quantity >= ?3
        RETURNING quantity
        "#,
    )
    .bind(location_id)
    .bind(product_id)
    .bind(amount)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    match updated {
        Some(quantity) => Ok(quantity),
        None => {
            let available = get_quantity(conn, location_id, product_id).await?;
            Err(EngineError::Rejected(CoreError::InsufficientStock {
                location_id: location_id.to_string(),
                product_id: product_id.to_string(),
                available,
                requested: amount,
            }))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
