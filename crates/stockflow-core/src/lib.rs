//! # stockflow-core: Pure Business Logic for Stockflow
//!
//! This crate holds the domain model of the inventory ledger as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockflow Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI collaborator (out of scope)                  │   │
//! │  │    stages rows ──► PendingBatch ──► submit_* command            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockflow-api (commands, ApiError)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockflow-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ amounts │ │  rows   │ │  batch  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          stockflow-db (SQLite, repositories, engine)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Location, Product, ledger records)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`amounts`] - Cost/sale amount computation at commit time
//! - [`rows`] - Raw batch rows as submitted by the UI, and their parsing
//! - [`batch`] - In-memory staging of pending rows
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockflow_core::amounts::compute_amounts;
//! use stockflow_core::money::Money;
//! use stockflow_core::types::Product;
//!
//! let product = Product::new("p-1", "Coffee 250g", "unit", 850, 1999);
//! let amounts = compute_amounts(&product, 3).unwrap();
//!
//! assert_eq!(amounts.cost_amount, Money::from_cents(2550));
//! assert_eq!(amounts.sale_amount, Money::from_cents(5997));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amounts;
pub mod batch;
pub mod error;
pub mod money;
pub mod rows;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use amounts::{compute_amounts, Amounts};
pub use batch::PendingBatch;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum rows accepted in a single submitted batch.
///
/// ## Business Reason
/// Keeps one commit (and its write lock) short; the UI stages at most a
/// screenful of rows before confirming.
pub const MAX_BATCH_ROWS: usize = 100;

/// Maximum quantity on a single row.
///
/// Bounds `price_cents * quantity` far below `i64::MAX` for any realistic
/// reference price.
pub const MAX_ROW_QUANTITY: i64 = 1_000_000;
