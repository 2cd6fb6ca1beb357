//! # API Configuration
//!
//! Settings for the command surface, read from environment variables.
//!
//! ## Variables
//! ```text
//! ┌────────────────────────────┬──────────────────┬──────────────────────────┐
//! │ Variable                   │ Default          │ Meaning                  │
//! ├────────────────────────────┼──────────────────┼──────────────────────────┤
//! │ STOCKFLOW_DB_PATH          │ ./stockflow.db   │ SQLite database file     │
//! │ STOCKFLOW_MAX_CONNECTIONS  │ 5                │ Pool size                │
//! │ STOCKFLOW_RUN_MIGRATIONS   │ true             │ Migrate on connect       │
//! └────────────────────────────┴──────────────────┴──────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::env;

use stockflow_db::DbConfig;

const DEFAULT_DB_PATH: &str = "./stockflow.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Command surface configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// SQLite database file path
    pub db_path: String,

    /// Maximum pooled connections
    pub max_connections: u32,

    /// Apply pending migrations when connecting
    pub run_migrations: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            db_path: DEFAULT_DB_PATH.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ApiConfig {
            db_path: lookup("STOCKFLOW_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),

            max_connections: lookup("STOCKFLOW_MAX_CONNECTIONS")
                .unwrap_or_else(|| DEFAULT_MAX_CONNECTIONS.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKFLOW_MAX_CONNECTIONS".to_string()))?,

            run_migrations: lookup("STOCKFLOW_RUN_MIGRATIONS")
                .map(|v| parse_flag(&v))
                .transpose()
                .map_err(|_| ConfigError::InvalidValue("STOCKFLOW_RUN_MIGRATIONS".to_string()))?
                .unwrap_or(true),
        };

        if config.db_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("STOCKFLOW_DB_PATH".to_string()));
        }

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("STOCKFLOW_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
    }
}

fn parse_flag(value: &str) -> Result<bool, ()> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(()),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
