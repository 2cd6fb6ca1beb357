//! # Stockflow Command Runner
//!
//! Executes one JSON command against the configured database.
//!
//! ## Usage
//! ```bash
//! # From a file
//! stockflow sales.json
//!
//! # From stdin
//! echo '{"command": "list_in_stock", "locationId": "demo-wh"}' | stockflow
//! ```
//!
//! ## Output
//! ```text
//! success ──► stdout: response JSON            exit 0
//! failure ──► stdout: {"code", "message", ...} exit 1 (client) / 2 (server)
//! ```
//!
//! Configuration comes from `STOCKFLOW_DB_PATH`, `STOCKFLOW_MAX_CONNECTIONS`
//! and `STOCKFLOW_RUN_MIGRATIONS`.

use std::io::Read;
use std::process::ExitCode;
use tracing::info;

use stockflow_api::config::ApiConfig;
use stockflow_api::error::ApiError;
use stockflow_api::{execute, init_tracing, Command};
use stockflow_db::Database;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(response) => {
            println!("{}", response);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match serde_json::to_string(&err) {
                Ok(body) => println!("{}", body),
                Err(_) => eprintln!("{}", err),
            }
            if err.is_client_error() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}

async fn run() -> Result<serde_json::Value, ApiError> {
    let input = read_input()?;
    let command = Command::from_json(&input)?;

    let config = ApiConfig::from_env()?;
    info!(db_path = %config.db_path, command = command.name(), "Starting stockflow");

    let db = Database::new(config.to_db_config()).await?;
    let result = execute(&db, command).await;
    db.close().await;

    result
}

/// Reads the command from the first argument's file, or stdin.
fn read_input() -> Result<String, ApiError> {
    match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| ApiError::validation(format!("Cannot read {}: {}", path, e))),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ApiError::validation(format!("Cannot read stdin: {}", e)))?;
            Ok(buf)
        }
    }
}
