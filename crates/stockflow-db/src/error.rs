//! # Database Error Types
//!
//! Error types for database operations and ledger batches.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Rule violation (CoreError)        │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  DbError (storage failure)           EngineError::Row { row, .. }      │
//! │       │                                     │                           │
//! │       └──────────────► EngineError ◄────────┘                           │
//! │                            │                                            │
//! │                            ▼                                            │
//! │              batch transaction rolled back                              │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                 ApiError (in stockflow-api)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockflow_core::rows::RowError;
use stockflow_core::CoreError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for logging. None of them is a business rule violation.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a location or product that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A write would store a negative quantity (the engine checks first,
    ///   so reaching this means a bug or a direct SQL write)
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored row could not be mapped back to a domain type.
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a CorruptRow error.
    pub fn corrupt(entity: impl Into<String>, id: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::CorruptRow {
            entity: entity.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Why a submitted batch was not committed.
///
/// Every variant means the batch transaction was rolled back: no inventory
/// counter moved and no ledger record was written.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A specific row broke a ledger rule. `row` is 1-based.
    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: CoreError,
    },

    /// A rule violation not tied to one row (empty batch, oversized batch).
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Underlying persistence failure.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl EngineError {
    /// Attaches a 1-based row number to a rule violation.
    pub fn at_row(row: usize, source: CoreError) -> Self {
        EngineError::Row { row, source }
    }

    /// Pins a row-less rule violation to `row`. Storage errors and errors
    /// already carrying a row are returned unchanged.
    pub fn in_row(self, row: usize) -> Self {
        match self {
            EngineError::Rejected(source) => EngineError::Row { row, source },
            other => other,
        }
    }

    /// The rule violation, if this is not a storage failure.
    pub fn core_error(&self) -> Option<&CoreError> {
        match self {
            EngineError::Row { source, .. } => Some(source),
            EngineError::Rejected(e) => Some(e),
            EngineError::Storage(_) => None,
        }
    }
}

impl From<RowError> for EngineError {
    fn from(err: RowError) -> Self {
        EngineError::Row {
            row: err.row,
            source: err.error,
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(err.into())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_message_is_prefixed() {
        let err = EngineError::at_row(
            2,
            CoreError::InsufficientStock {
                location_id: "W".to_string(),
                product_id: "P".to_string(),
                available: 10,
                requested: 15,
            },
        );
        assert_eq!(
            err.to_string(),
            "Row 2: Insufficient stock of P at W: available 10, requested 15"
        );
        assert!(err.core_error().is_some());
    }

    #[test]
    fn test_in_row_only_pins_rule_violations() {
        let pinned = EngineError::from(CoreError::ProductNotFound("P".to_string())).in_row(4);
        assert!(matches!(pinned, EngineError::Row { row: 4, .. }));

        let already = EngineError::at_row(1, CoreError::EmptyBatch).in_row(9);
        assert!(matches!(already, EngineError::Row { row: 1, .. }));

        let storage = EngineError::from(DbError::PoolExhausted).in_row(2);
        assert!(matches!(storage, EngineError::Storage(_)));
    }

    #[test]
    fn test_storage_error_has_no_core_error() {
        let err: EngineError = DbError::PoolExhausted.into();
        assert!(err.core_error().is_none());
    }
}
