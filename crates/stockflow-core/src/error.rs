//! # Error Types
//!
//! Domain-specific error types for stockflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockflow-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  stockflow-db errors (separate crate)                                  │
//! │  ├── DbError          - Storage failures                               │
//! │  └── EngineError      - Row-numbered CoreError or DbError              │
//! │                                                                         │
//! │  stockflow-api errors                                                  │
//! │  └── ApiError         - What the UI sees (code, message, status)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → UI       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;
use crate::types::LocationKind;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// Every variant is a client-side failure: the batch is rejected as a whole
/// and the message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Date string does not name a real calendar date.
    #[error("Invalid date '{value}': expected DD/MM/YYYY or YYYY-MM-DD")]
    InvalidDate { value: String },

    /// Quantity is not a positive integer within the row limit.
    #[error("Invalid quantity '{value}': must be a whole number between 1 and {max}")]
    InvalidQuantity { value: String, max: i64 },

    /// Monetary amount is malformed or not positive.
    #[error("Invalid amount '{value}'")]
    InvalidAmount { value: String },

    /// Decrement would drive a counter negative.
    ///
    /// ## User Workflow
    /// ```text
    /// Outflow row (qty: 15)
    ///      │
    ///      ▼
    /// Warehouse has 10
    ///      │
    ///      ▼
    /// InsufficientStock { available: 10, requested: 15 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock of P at W: available 10, requested 15"
    /// ```
    #[error(
        "Insufficient stock of {product_id} at {location_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        location_id: String,
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Withdrawal exceeds the cash collected that day.
    #[error(
        "Withdrawal of {requested} on {date} exceeds available cash {available} at {sales_area_id} (short by {shortfall})"
    )]
    ExcessiveWithdrawal {
        sales_area_id: String,
        date: NaiveDate,
        available: Money,
        requested: Money,
        shortfall: Money,
    },

    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Location id does not exist.
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Location exists but is the wrong kind for the operation.
    #[error("Location {location_id} is not a {expected}")]
    WrongLocationKind {
        location_id: String,
        expected: LocationKind,
    },

    /// Transfer between a location and itself.
    #[error("Source and destination are the same location: {0}")]
    SameLocation(String),

    /// Nothing to commit.
    #[error("Batch has no rows")]
    EmptyBatch,

    /// Batch exceeds [`crate::MAX_BATCH_ROWS`].
    #[error("Batch cannot have more than {max} rows")]
    BatchTooLarge { max: usize },

    /// Edit or removal of a staged row that does not exist.
    #[error("Row {index} does not exist (batch has {len} rows)")]
    RowIndexOutOfRange { index: usize, len: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidQuantity error with the crate-wide row limit.
    pub fn invalid_quantity(value: impl Into<String>) -> Self {
        CoreError::InvalidQuantity {
            value: value.into(),
            max: crate::MAX_ROW_QUANTITY,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
