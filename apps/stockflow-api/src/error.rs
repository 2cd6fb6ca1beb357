//! # API Error Type
//!
//! Unified error type for stockflow commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockflow                              │
//! │                                                                         │
//! │  Caller                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  {"command": "submit_sales", "rows": [...]}                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Row rejected? ─── EngineError::Row { 2, InsufficientStock } ─┐  │  │
//! │  │         │                                                     │  │  │
//! │  │         ▼                                                     ▼  │  │
//! │  │  Storage failed? ─── DbError::QueryFailed("...") ──────── ApiError ─►│
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"code": "INSUFFICIENT_STOCK", "status": 409,                          │
//! │   "message": "Row 2: Insufficient stock of P at S1: ..."}               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rule violations carry their message through verbatim. Storage failures
//! are logged with detail and answered with a generic message.

use serde::Serialize;
use stockflow_core::CoreError;
use stockflow_db::{DbError, EngineError};

use crate::config::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "EXCESSIVE_WITHDRAWAL",
///   "message": "Row 1: Withdrawal of 80.00 on 2024-02-20 exceeds ...",
///   "status": 422
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// HTTP-style status
    pub status: u16,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Counter would go negative (409)
    InsufficientStock,

    /// Withdrawal above the day's cash (422)
    ExcessiveWithdrawal,

    /// Other ledger rule violation (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,

    /// Configuration is unusable (500)
    ConfigError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP-style status for this code.
    pub const fn status(self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::InsufficientStock => 409,
            ErrorCode::ExcessiveWithdrawal | ErrorCode::BusinessLogic => 422,
            ErrorCode::DatabaseError | ErrorCode::ConfigError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            status: code.status(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// True for 4xx errors.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// Code for a rule violation.
fn core_code(err: &CoreError) -> ErrorCode {
    match err {
        CoreError::ProductNotFound(_) | CoreError::LocationNotFound(_) => ErrorCode::NotFound,
        CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
        CoreError::ExcessiveWithdrawal { .. } => ErrorCode::ExcessiveWithdrawal,
        CoreError::WrongLocationKind { .. } | CoreError::SameLocation(_) => ErrorCode::BusinessLogic,
        CoreError::InvalidDate { .. }
        | CoreError::InvalidQuantity { .. }
        | CoreError::InvalidAmount { .. }
        | CoreError::EmptyBatch
        | CoreError::BatchTooLarge { .. }
        | CoreError::RowIndexOutOfRange { .. }
        | CoreError::Validation(_) => ErrorCode::ValidationError,
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(core_code(&err), err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value out of range")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CorruptRow { entity, id, reason } => {
                tracing::error!(%entity, %id, %reason, "Corrupt row");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts engine errors to API errors, keeping the row number in the
/// message.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Row { row, source } => {
                ApiError::new(core_code(&source), format!("Row {}: {}", row, source))
            }
            EngineError::Rejected(e) => e.into(),
            EngineError::Storage(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

/// Malformed command envelopes.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::validation(format!("Malformed command: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockflow_core::{LocationKind, Money};

    #[test]
    fn test_row_error_keeps_row_number_and_status() {
        let err: ApiError = EngineError::at_row(
            2,
            CoreError::InsufficientStock {
                location_id: "W".to_string(),
                product_id: "P".to_string(),
                available: 10,
                requested: 15,
            },
        )
        .into();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.status, 409);
        assert_eq!(
            err.message,
            "Row 2: Insufficient stock of P at W: available 10, requested 15"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_excessive_withdrawal_is_unprocessable() {
        let err: ApiError = CoreError::ExcessiveWithdrawal {
            sales_area_id: "S1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
            available: Money::from_cents(7000),
            requested: Money::from_cents(8000),
            shortfall: Money::from_cents(1000),
        }
        .into();

        assert_eq!(err.code, ErrorCode::ExcessiveWithdrawal);
        assert_eq!(err.status, 422);
        assert!(err.message.contains("short by 10.00"));
    }

    #[test]
    fn test_client_error_statuses() {
        let cases = [
            (CoreError::ProductNotFound("P".to_string()), 404),
            (CoreError::LocationNotFound("X".to_string()), 404),
            (CoreError::EmptyBatch, 400),
            (CoreError::invalid_quantity("0"), 400),
            (CoreError::SameLocation("S1".to_string()), 422),
            (
                CoreError::WrongLocationKind {
                    location_id: "S1".to_string(),
                    expected: LocationKind::Warehouse,
                },
                422,
            ),
        ];

        for (core, status) in cases {
            let err: ApiError = core.into();
            assert_eq!(err.status, status, "{}", err.message);
        }
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err: ApiError =
            EngineError::Storage(DbError::QueryFailed("disk I/O error at page 7".to_string())).into();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "Database operation failed");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Location", "X")).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "Location not found: X");
    }
}
