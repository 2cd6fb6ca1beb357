//! # Pending Batch
//!
//! In-memory staging of rows before a single commit.
//!
//! ## Staging Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pending Batch Operations                             │
//! │                                                                         │
//! │  UI Action              PendingBatch              Effect               │
//! │  ─────────              ────────────              ──────               │
//! │                                                                         │
//! │  "Add row" ───────────► push(row) ──────────────► rows.push(row)       │
//! │                                                                         │
//! │  "Edit row" ──────────► replace(i, row) ────────► rows[i] = row        │
//! │                                                                         │
//! │  "Delete row" ────────► remove(i) ──────────────► rows.remove(i)       │
//! │                                                                         │
//! │  "Confirm" ───────────► into_rows() ────────────► one submit call      │
//! │                                                                         │
//! │  NOTE: editing only ever touches this list. Committed ledger records   │
//! │        are immutable; corrections are new offsetting rows.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::MAX_BATCH_ROWS;

/// Rows staged for one commit, in submission order.
///
/// ## Invariants
/// - At most [`MAX_BATCH_ROWS`] rows
/// - Order is preserved; the engine applies rows in this order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingBatch<R> {
    rows: Vec<R>,
}

impl<R> Default for PendingBatch<R> {
    fn default() -> Self {
        PendingBatch { rows: Vec::new() }
    }
}

impl<R> PendingBatch<R> {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row. Returns the row's index.
    pub fn push(&mut self, row: R) -> CoreResult<usize> {
        if self.rows.len() >= MAX_BATCH_ROWS {
            return Err(CoreError::BatchTooLarge {
                max: MAX_BATCH_ROWS,
            });
        }
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// Replaces the row at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, row: R) -> CoreResult<R> {
        let len = self.rows.len();
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowIndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, row))
    }

    /// Removes the row at `index`; later rows shift down by one.
    pub fn remove(&mut self, index: usize) -> CoreResult<R> {
        if index >= self.rows.len() {
            return Err(CoreError::RowIndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Row at `index`.
    pub fn get(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    /// All staged rows.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drops every row (after a successful commit or a cancel).
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Consumes the batch for submission.
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
