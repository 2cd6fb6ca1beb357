//! # Catalog Repository
//!
//! Reference data the ledger points at: stores, their locations, and
//! products with current reference prices.
//!
//! ## Ownership
//! ```text
//! Store ──┬── Location (warehouse)
//!         ├── Location (sales area)
//!         └── Location (sales area)
//!
//! Product (global, prices mutable, not versioned)
//! ```
//!
//! The engine reads locations and products through the `fetch_*` functions
//! below using the batch transaction's own connection, so a batch sees one
//! consistent set of prices.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockflow_core::{Location, LocationKind, Money, Product, Store};

/// Repository for stores, locations and products.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Inserts a store.
    pub async fn insert_store(&self, store: &Store) -> DbResult<()> {
        debug!(id = %store.id, "Inserting store");

        sqlx::query("INSERT INTO stores (id, name) VALUES (?1, ?2)")
            .bind(&store.id)
            .bind(&store.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets a store by ID.
    pub async fn get_store(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>("SELECT id, name FROM stores WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(store)
    }

    /// Lists all stores by name.
    pub async fn list_stores(&self) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>("SELECT id, name FROM stores ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(stores)
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// Inserts a warehouse or sales area.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - the store does not exist
    /// * `DbError::UniqueViolation` - the id is taken
    pub async fn insert_location(&self, location: &Location) -> DbResult<()> {
        debug!(id = %location.id, kind = %location.kind, "Inserting location");

        sqlx::query("INSERT INTO locations (id, store_id, kind, name) VALUES (?1, ?2, ?3, ?4)")
            .bind(&location.id)
            .bind(&location.store_id)
            .bind(location.kind)
            .bind(&location.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets a location by ID.
    pub async fn get_location(&self, id: &str) -> DbResult<Option<Location>> {
        let mut conn = self.pool.acquire().await?;
        fetch_location(&mut conn, id).await
    }

    /// Lists a store's locations, optionally filtered by kind.
    pub async fn list_locations(
        &self,
        store_id: &str,
        kind: Option<LocationKind>,
    ) -> DbResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, store_id, kind, name
            FROM locations
            WHERE store_id = ?1
              AND (?2 IS NULL OR kind = ?2)
            ORDER BY kind, name
            "#,
        )
        .bind(store_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Inserts a product.
    pub async fn insert_product(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, unit, cost_price, sale_price, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.unit)
        .bind(product.cost_price)
        .bind(product.sale_price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Lists all products by name.
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, unit, cost_price, sale_price FROM products ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Changes a product's reference prices.
    ///
    /// Committed ledger records keep the amounts computed at their commit.
    pub async fn update_prices(&self, id: &str, cost_price: Money, sale_price: Money) -> DbResult<()> {
        debug!(id = %id, cost = %cost_price, sale = %sale_price, "Updating product prices");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET cost_price = ?2, sale_price = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(cost_price)
        .bind(sale_price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// In-transaction reads
// =============================================================================

/// Reads a location on the given connection.
pub async fn fetch_location(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Location>> {
    let location = sqlx::query_as::<_, Location>(
        "SELECT id, store_id, kind, name FROM locations WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(location)
}

/// Reads a product (with its current prices) on the given connection.
pub async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, unit, cost_price, sale_price FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seeded_db, SALES_1, SALES_2, STORE, WAREHOUSE};

    #[tokio::test]
    async fn test_get_location() {
        let db = seeded_db().await;

        let warehouse = db.catalog().get_location(WAREHOUSE).await.unwrap().unwrap();
        assert_eq!(warehouse.kind, LocationKind::Warehouse);
        assert_eq!(warehouse.store_id, STORE);

        assert!(db.catalog().get_location("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_locations_by_kind() {
        let db = seeded_db().await;

        let areas = db
            .catalog()
            .list_locations(STORE, Some(LocationKind::SalesArea))
            .await
            .unwrap();
        let ids: Vec<_> = areas.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&SALES_1));
        assert!(ids.contains(&SALES_2));

        let all = db.catalog().list_locations(STORE, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_location_rejected() {
        let db = seeded_db().await;

        let dup = Location {
            id: WAREHOUSE.to_string(),
            store_id: STORE.to_string(),
            kind: LocationKind::Warehouse,
            name: "Again".to_string(),
        };
        let err = db.catalog().insert_location(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_prices() {
        let db = seeded_db().await;

        db.catalog()
            .update_prices("P", Money::from_cents(300), Money::from_cents(900))
            .await
            .unwrap();

        let product = db.catalog().get_product("P").await.unwrap().unwrap();
        assert_eq!(product.cost_price, Money::from_cents(300));
        assert_eq!(product.sale_price, Money::from_cents(900));

        let err = db
            .catalog()
            .update_prices("nope", Money::zero(), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
