//! # stockflow-db: Storage and Ledger Engine for Stockflow
//!
//! SQLite storage through sqlx, plus the engine that applies ledger batches
//! atomically.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockflow Data Flow                              │
//! │                                                                         │
//! │  stockflow-api command (submit_sales)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockflow-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Engine     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine/)    │───►│               │    │  (embedded)  │  │   │
//! │  │   │               │    │ catalog       │    │              │  │   │
//! │  │   │ one tx per    │    │ inventory     │    │ 001 schema   │  │   │
//! │  │   │ batch         │    │ ledger        │    │ 002 ledger   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            │                    │                               │   │
//! │  │            └──── Database (pool.rs) ────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                SQLite Database (WAL)  stockflow.db              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage and batch error types
//! - [`repository`] - Catalog, inventory and ledger storage
//! - [`engine`] - Inflow, outflow, movement, sale and withdrawal batches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockflow_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockflow.db")).await?;
//!
//! let receipt = db.engine().submit_sales(&rows).await?;
//! let left = db.inventory().get_quantity("S1", "P").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{BatchReceipt, Engine};
pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::ledger::{LedgerCounts, LedgerRepository};
