//! # Stockflow API Library
//!
//! Command surface over the stockflow ledger engine. UI collaborators send
//! one JSON `Command` and receive one JSON response.
//!
//! ## Module Organization
//! ```text
//! stockflow_api/
//! ├── lib.rs          ◄─── You are here (Command envelope, dispatch)
//! ├── config.rs       ◄─── ApiConfig from environment
//! ├── commands/
//! │   ├── mod.rs      ◄─── BatchAck, exports
//! │   ├── inflow.rs   ◄─── submit_inflows
//! │   ├── outflow.rs  ◄─── submit_outflows
//! │   ├── movement.rs ◄─── submit_movements
//! │   ├── sale.rs     ◄─── submit_sales
//! │   ├── withdraw.rs ◄─── submit_withdrawals, available_cash
//! │   └── inventory.rs◄─── stock queries, set_min_stock
//! └── error.rs        ◄─── ApiError returned by every command
//! ```
//!
//! ## Envelope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {"command": "submit_sales", "rows": [ {...}, {...} ]}                  │
//! │  {"command": "list_low_stock", "locationId": "W"}                       │
//! │  {"command": "available_cash", "salesAreaId": "S1",                     │
//! │   "date": "20/02/2024"}                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  serde_json ──► Command ──► execute(&db, cmd) ──► serde_json::Value     │
//! │                                   │                                     │
//! │                                   └──► Err(ApiError) ──► {code, ...}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Row payloads keep their snake_case field names; every other key is
//! camelCase.

pub mod commands;
pub mod config;
pub mod error;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use error::ApiError;
use stockflow_core::rows::{
    InflowRowInput, MovementRowInput, OutflowRowInput, SaleRowInput, WithdrawRowInput,
};
use stockflow_db::Database;

/// One request to the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SubmitInflows {
        rows: Vec<InflowRowInput>,
    },
    SubmitOutflows {
        rows: Vec<OutflowRowInput>,
    },
    SubmitMovements {
        rows: Vec<MovementRowInput>,
    },
    SubmitSales {
        rows: Vec<SaleRowInput>,
    },
    SubmitWithdrawals {
        rows: Vec<WithdrawRowInput>,
    },
    #[serde(rename_all = "camelCase")]
    ListInStock {
        location_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ListLowStock {
        location_id: String,
    },
    #[serde(rename_all = "camelCase")]
    GetQuantity {
        location_id: String,
        product_id: String,
    },
    #[serde(rename_all = "camelCase")]
    SetMinStock {
        location_id: String,
        product_id: String,
        min_stock: i64,
    },
    #[serde(rename_all = "camelCase")]
    AvailableCash {
        sales_area_id: String,
        date: String,
    },
}

impl Command {
    /// Decodes a command envelope.
    pub fn from_json(input: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Envelope tag, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SubmitInflows { .. } => "submit_inflows",
            Command::SubmitOutflows { .. } => "submit_outflows",
            Command::SubmitMovements { .. } => "submit_movements",
            Command::SubmitSales { .. } => "submit_sales",
            Command::SubmitWithdrawals { .. } => "submit_withdrawals",
            Command::ListInStock { .. } => "list_in_stock",
            Command::ListLowStock { .. } => "list_low_stock",
            Command::GetQuantity { .. } => "get_quantity",
            Command::SetMinStock { .. } => "set_min_stock",
            Command::AvailableCash { .. } => "available_cash",
        }
    }
}

/// Runs one command and serializes its response.
pub async fn execute(db: &Database, command: Command) -> Result<Value, ApiError> {
    debug!(command = command.name(), "Dispatching command");

    let value = match command {
        Command::SubmitInflows { rows } => to_value(commands::inflow::submit_inflows(db, rows).await?)?,
        Command::SubmitOutflows { rows } => {
            to_value(commands::outflow::submit_outflows(db, rows).await?)?
        }
        Command::SubmitMovements { rows } => {
            to_value(commands::movement::submit_movements(db, rows).await?)?
        }
        Command::SubmitSales { rows } => to_value(commands::sale::submit_sales(db, rows).await?)?,
        Command::SubmitWithdrawals { rows } => {
            to_value(commands::withdraw::submit_withdrawals(db, rows).await?)?
        }
        Command::ListInStock { location_id } => {
            to_value(commands::inventory::list_in_stock(db, &location_id).await?)?
        }
        Command::ListLowStock { location_id } => {
            to_value(commands::inventory::list_low_stock(db, &location_id).await?)?
        }
        Command::GetQuantity {
            location_id,
            product_id,
        } => to_value(commands::inventory::get_quantity(db, &location_id, &product_id).await?)?,
        Command::SetMinStock {
            location_id,
            product_id,
            min_stock,
        } => {
            commands::inventory::set_min_stock(db, &location_id, &product_id, min_stock).await?;
            json!({ "ok": true })
        }
        Command::AvailableCash {
            sales_area_id,
            date,
        } => to_value(commands::withdraw::available_cash(db, &sales_area_id, &date).await?)?,
    };

    Ok(value)
}

fn to_value<T: Serialize>(response: T) -> Result<Value, ApiError> {
    serde_json::to_value(response).map_err(|e| ApiError::internal(format!("Failed to encode response: {}", e)))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockflow=trace` - Show trace for stockflow crates only
/// - Default: INFO, DEBUG for stockflow crates
///
/// Logs go to stderr so stdout carries only the JSON response.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockflow=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{db, SALES_1, WAREHOUSE};

    #[test]
    fn test_decode_envelopes() {
        let cmd = Command::from_json(
            r#"{"command": "available_cash", "salesAreaId": "S1", "date": "20/02/2024"}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::AvailableCash {
                sales_area_id: "S1".to_string(),
                date: "20/02/2024".to_string(),
            }
        );

        let cmd = Command::from_json(
            r#"{
                "command": "submit_sales",
                "rows": [{
                    "sales_area_id": "S1",
                    "product_id": "P",
                    "quantity": "3",
                    "pay_method": "cash",
                    "date": "20/02/2024",
                    "user_id": "ana"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(cmd.name(), "submit_sales");
    }

    #[test]
    fn test_malformed_envelope_is_validation_error() {
        let err = Command::from_json(r#"{"command": "launch_rockets"}"#).unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.message.starts_with("Malformed command"));

        assert!(Command::from_json("not json").is_err());
    }

    #[tokio::test]
    async fn test_execute_round_trip() {
        let db = db().await;

        let cmd = Command::from_json(
            r#"{
                "command": "submit_inflows",
                "rows": [{
                    "warehouse_id": "W",
                    "product_id": "P",
                    "quantity": "50",
                    "source": {"kind": "company", "provider": "Acme Foods"},
                    "date": "20/02/2024",
                    "user_id": "ana"
                }]
            }"#,
        )
        .unwrap();
        let ack = execute(&db, cmd).await.unwrap();
        assert_eq!(ack["rowsApplied"], 1);
        assert!(ack["batchId"].is_string());

        let quantity = execute(
            &db,
            Command::GetQuantity {
                location_id: WAREHOUSE.to_string(),
                product_id: "P".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(quantity["quantity"], 50);
    }

    #[tokio::test]
    async fn test_execute_surfaces_rule_violation() {
        let db = db().await;

        let cmd = Command::from_json(
            r#"{
                "command": "submit_withdrawals",
                "rows": [{
                    "sales_area_id": "S1",
                    "amount": "10.00",
                    "date": "2024-02-20",
                    "user_id": "ana"
                }]
            }"#,
        )
        .unwrap();
        let err = execute(&db, cmd).await.unwrap_err();

        assert_eq!(err.status, 422);
        assert!(err.message.starts_with("Row 1:"));

        let cash = execute(
            &db,
            Command::AvailableCash {
                sales_area_id: SALES_1.to_string(),
                date: "2024-02-20".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(cash["available"], "0.00");
    }
}
