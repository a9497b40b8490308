//! Server functions proxying the clinic tables, and the data source that
//! calls them.
//!
//! The browser never talks to the hosted backend directly. Each table
//! operation is a server function that validates its input and forwards it
//! to the `DataSource` registered on the router.

use async_trait::async_trait;
use leptos::prelude::*;
use medicare_backend::{BackendError, DataSource, Order, Projection};
use medicare_core::RecordId;
use serde_json::Value;

/// Reads a table newest-first.
#[server]
pub async fn select_rows(table: String, projection: String) -> Result<Vec<Value>, ServerFnError> {
    use crate::server_helpers::{
        backend_error, checked_projection, checked_table, get_data_source,
    };

    let spec = checked_table(&table).map_err(|e| e.into_server_error())?;
    let projection = checked_projection(&spec, &projection).map_err(|e| e.into_server_error())?;
    let source = get_data_source().await.map_err(|e| e.into_server_error())?;

    let rows = source
        .select(spec.table, &projection, Order::newest_first())
        .await
        .map_err(|e| backend_error(&spec, "select", e.to_string()).into_server_error())?;

    tracing::debug!(table = %spec.table, rows = rows.len(), "Selected rows");
    Ok(rows)
}

/// Inserts a row given as a JSON object.
#[server]
pub async fn insert_row(table: String, row_json: String) -> Result<Value, ServerFnError> {
    use crate::server_helpers::{backend_error, checked_payload, checked_table, get_data_source};

    let spec = checked_table(&table).map_err(|e| e.into_server_error())?;
    let row = checked_payload(&spec, &row_json).map_err(|e| e.into_server_error())?;
    let source = get_data_source().await.map_err(|e| e.into_server_error())?;

    let stored = source
        .insert(spec.table, row)
        .await
        .map_err(|e| backend_error(&spec, "insert", e.to_string()).into_server_error())?;

    tracing::info!(table = %spec.table, "Inserted row");
    Ok(stored)
}

/// Applies a partial update, given as a JSON object, to one row.
#[server]
pub async fn update_row(
    table: String,
    id: String,
    patch_json: String,
) -> Result<Value, ServerFnError> {
    use crate::server_helpers::{
        backend_error, checked_id, checked_payload, checked_table, get_data_source,
    };

    let spec = checked_table(&table).map_err(|e| e.into_server_error())?;
    let id = checked_id(&id).map_err(|e| e.into_server_error())?;
    let patch = checked_payload(&spec, &patch_json).map_err(|e| e.into_server_error())?;
    let source = get_data_source().await.map_err(|e| e.into_server_error())?;

    let stored = source
        .update(spec.table, &id, patch)
        .await
        .map_err(|e| backend_error(&spec, "update", e.to_string()).into_server_error())?;

    tracing::info!(table = %spec.table, id = %id, "Updated row");
    Ok(stored)
}

/// Deletes one row.
#[server]
pub async fn delete_row(table: String, id: String) -> Result<(), ServerFnError> {
    use crate::server_helpers::{backend_error, checked_id, checked_table, get_data_source};

    let spec = checked_table(&table).map_err(|e| e.into_server_error())?;
    let id = checked_id(&id).map_err(|e| e.into_server_error())?;
    let source = get_data_source().await.map_err(|e| e.into_server_error())?;

    source
        .delete(spec.table, &id)
        .await
        .map_err(|e| backend_error(&spec, "delete", e.to_string()).into_server_error())?;

    tracing::info!(table = %spec.table, id = %id, "Deleted row");
    Ok(())
}

/// Returns the configured session lifetime in hours.
#[server]
pub async fn session_max_age_hours() -> Result<i64, ServerFnError> {
    use crate::config::SessionConfig;
    use axum::Extension;

    let Extension(config): Extension<SessionConfig> = leptos_axum::extract().await?;
    Ok(config.max_age_hours)
}

/// A [`DataSource`] that goes through the proxy server functions.
///
/// Ordering is fixed server-side to newest-first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFnSource;

fn proxy_error(table: &str, err: ServerFnError) -> BackendError {
    let reason = match err {
        ServerFnError::ServerError(message) => message,
        other => other.to_string(),
    };
    BackendError::Request {
        table: table.to_string(),
        reason,
    }
}

fn encode(table: &str, value: &Value) -> Result<String, BackendError> {
    serde_json::to_string(value).map_err(|e| BackendError::InvalidRow {
        table: table.to_string(),
        reason: e.to_string(),
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DataSource for ServerFnSource {
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        _order: Order,
    ) -> medicare_core::Result<Vec<Value>, BackendError> {
        Ok(select_rows(table.to_string(), projection.to_string())
            .await
            .map_err(|e| proxy_error(table, e))?)
    }

    async fn insert(&self, table: &str, row: Value) -> medicare_core::Result<Value, BackendError> {
        let row_json = encode(table, &row)?;
        Ok(insert_row(table.to_string(), row_json)
            .await
            .map_err(|e| proxy_error(table, e))?)
    }

    async fn update(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> medicare_core::Result<Value, BackendError> {
        let patch_json = encode(table, &patch)?;
        Ok(update_row(table.to_string(), id.to_string(), patch_json)
            .await
            .map_err(|e| proxy_error(table, e))?)
    }

    async fn delete(&self, table: &str, id: &RecordId) -> medicare_core::Result<(), BackendError> {
        Ok(delete_row(table.to_string(), id.to_string())
            .await
            .map_err(|e| proxy_error(table, e))?)
    }
}
