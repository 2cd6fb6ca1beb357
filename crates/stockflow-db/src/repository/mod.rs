//! # Repository Module
//!
//! Database repository implementations for Stockflow.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways In                                          │
//! │                                                                         │
//! │  Standalone reads (commands, reports)                                  │
//! │       │  db.inventory().list_in_stock("S1")                            │
//! │       ▼                                                                 │
//! │  XxxRepository { pool }  ── one pooled connection per call             │
//! │                                                                         │
//! │  Batch writes (engine)                                                 │
//! │       │  inventory::decrement(&mut *tx, "S1", "P", 3)                  │
//! │       ▼                                                                 │
//! │  free functions over &mut SqliteConnection ── the batch transaction    │
//! │                                                                         │
//! │  SQL stays in this module either way.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - stores, locations, products
//! - [`InventoryRepository`](inventory::InventoryRepository) - stock counters
//! - [`LedgerRepository`](ledger::LedgerRepository) - committed ledger records

pub mod catalog;
pub mod inventory;
pub mod ledger;
