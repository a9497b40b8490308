//! The data-source seam.
//!
//! A data source speaks in raw JSON rows; typing happens one layer up in
//! [`crate::query`]. Implementations:
//! - [`crate::rest::RestSource`]: the hosted backend over HTTP (feature `http`)
//! - [`crate::memory::MemorySource`]: in-process tables for tests and demos
//!
//! The browser build adds a source that forwards to server functions, whose
//! futures are not `Send`; hence the relaxed bound on wasm.

use crate::error::BackendError;
use crate::projection::{Order, Projection};
use async_trait::async_trait;
use medicare_core::{RecordId, Result};
use serde_json::Value;

/// Table-level CRUD against the backend.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DataSource: Send + Sync {
    /// Returns the projected rows of `table` in the given order.
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        order: Order,
    ) -> Result<Vec<Value>, BackendError>;

    /// Inserts a row and returns it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError>;

    /// Applies a partial update to the row with `id` and returns it as stored.
    async fn update(&self, table: &str, id: &RecordId, patch: Value)
    -> Result<Value, BackendError>;

    /// Deletes the row with `id`.
    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), BackendError>;
}
