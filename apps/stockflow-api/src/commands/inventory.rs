//! # Inventory Commands
//!
//! Read-only stock views for pickers and reports, plus the low-stock
//! threshold setting.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use stockflow_core::validation::validate_min_stock;
use stockflow_core::StockLine;
use stockflow_db::Database;

/// One product's stock at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLineDto {
    pub location_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    /// Quantity at or below the threshold
    pub low_stock: bool,
}

impl From<StockLine> for StockLineDto {
    fn from(line: StockLine) -> Self {
        StockLineDto {
            low_stock: line.quantity <= line.min_stock,
            location_id: line.location_id,
            product_id: line.product_id,
            product_name: line.product_name,
            unit: line.unit,
            quantity: line.quantity,
            min_stock: line.min_stock,
            cost_price_cents: line.cost_price.cents(),
            sale_price_cents: line.sale_price.cents(),
        }
    }
}

/// Counter value for one (location, product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityDto {
    pub location_id: String,
    pub product_id: String,
    pub quantity: i64,
}

/// Products with stock at a location.
pub async fn list_in_stock(db: &Database, location_id: &str) -> Result<Vec<StockLineDto>, ApiError> {
    debug!(location_id = %location_id, "list_in_stock command");

    let lines = db.inventory().list_in_stock(location_id).await?;
    Ok(lines.into_iter().map(StockLineDto::from).collect())
}

/// Products at or below their threshold at a location.
pub async fn list_low_stock(db: &Database, location_id: &str) -> Result<Vec<StockLineDto>, ApiError> {
    debug!(location_id = %location_id, "list_low_stock command");

    let lines = db.inventory().list_low_stock(location_id).await?;
    Ok(lines.into_iter().map(StockLineDto::from).collect())
}

/// Current quantity; zero when the product never reached the location.
pub async fn get_quantity(
    db: &Database,
    location_id: &str,
    product_id: &str,
) -> Result<QuantityDto, ApiError> {
    debug!(location_id = %location_id, product_id = %product_id, "get_quantity command");

    let quantity = db.inventory().get_quantity(location_id, product_id).await?;
    Ok(QuantityDto {
        location_id: location_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
    })
}

/// Sets the low-stock threshold for a (location, product).
pub async fn set_min_stock(
    db: &Database,
    location_id: &str,
    product_id: &str,
    min_stock: i64,
) -> Result<(), ApiError> {
    debug!(location_id = %location_id, product_id = %product_id, min_stock, "set_min_stock command");

    validate_min_stock(min_stock).map_err(|e| ApiError::validation(e.to_string()))?;
    db.inventory()
        .set_min_stock(location_id, product_id, min_stock)
        .await?;
    Ok(())
}
