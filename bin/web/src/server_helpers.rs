//! Helper functions for the data proxy server functions.
//!
//! Everything the browser sends is untrusted: table names are checked
//! against the known tables, projections and ids are parsed, and payloads
//! must be JSON objects.

use crate::error::DataError;
use axum::Extension;
use medicare_backend::{
    BackendConfig, BackendError, DataSource, MemorySource, Projection, RestSource, TableSpec,
    table_spec,
};
use medicare_core::RecordId;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

/// Builds the data source for the router: the hosted backend when one is
/// configured, otherwise seeded in-memory tables.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the demo rows
/// cannot be seeded.
pub fn build_data_source(
    backend: Option<BackendConfig>,
) -> medicare_core::Result<Arc<dyn DataSource>, BackendError> {
    match backend {
        Some(backend) => {
            tracing::info!(url = %backend.url, "Using hosted backend");
            Ok(Arc::new(RestSource::new(backend)?))
        }
        None => {
            tracing::warn!("BACKEND__URL not set; serving seeded in-memory tables");
            Ok(Arc::new(MemorySource::with_demo_data()?))
        }
    }
}

/// Returns the data source registered on the router.
pub async fn get_data_source() -> Result<Arc<dyn DataSource>, DataError> {
    leptos_axum::extract::<Extension<Arc<dyn DataSource>>>()
        .await
        .map(|Extension(source)| source)
        .map_err(|e| {
            tracing::error!(error = %e, "Data source missing from request extensions");
            DataError::Unavailable
        })
}

/// Looks up a table the application exposes.
pub fn checked_table(table: &str) -> Result<TableSpec, DataError> {
    table_spec(table).ok_or_else(|| {
        tracing::debug!(table = %table, "Rejected unknown table");
        DataError::UnknownTable {
            table: table.to_string(),
        }
    })
}

/// Parses a projection, falling back to the table's default when empty.
pub fn checked_projection(spec: &TableSpec, projection: &str) -> Result<Projection, DataError> {
    let projection = if projection.trim().is_empty() {
        spec.projection
    } else {
        projection
    };
    Projection::parse(projection).map_err(|e| {
        tracing::debug!(table = %spec.table, error = %e, "Rejected projection");
        DataError::InvalidProjection {
            projection: projection.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Parses a row id.
pub fn checked_id(id: &str) -> Result<RecordId, DataError> {
    RecordId::from_str(id).map_err(|e| {
        tracing::debug!(id = %id, error = %e, "Rejected row id");
        DataError::InvalidId {
            id: id.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Parses a JSON object sent as a row or patch.
pub fn checked_payload(spec: &TableSpec, json: &str) -> Result<Value, DataError> {
    let invalid = |reason: String| DataError::InvalidPayload {
        table: spec.table.to_string(),
        reason,
    };
    let value: Value = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
    if !value.is_object() {
        return Err(invalid("expected a JSON object".to_string()));
    }
    Ok(value)
}

/// Wraps a data source failure, logging the full report.
pub fn backend_error(spec: &TableSpec, operation: &'static str, details: String) -> DataError {
    tracing::error!(table = %spec.table, operation, error = %details, "Backend request failed");
    DataError::Backend {
        table: spec.table.to_string(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medicare_backend::Order;

    #[tokio::test]
    async fn missing_backend_serves_demo_tables() {
        let source = build_data_source(None).expect("memory source");
        let spec = checked_table("patients").expect("known");
        let projection = checked_projection(&spec, "").expect("default");
        let rows = source
            .select(spec.table, &projection, Order::newest_first())
            .await
            .expect("select");
        assert!(rows.iter().any(|row| row["id"] == "demo-patient"));
    }

    #[test]
    fn configured_backend_builds_a_rest_client() {
        let backend = BackendConfig::new("https://clinic.example.com", "published-key");
        assert!(build_data_source(Some(backend)).is_ok());
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(checked_table("patients").is_ok());
        assert!(matches!(
            checked_table("auth.users"),
            Err(DataError::UnknownTable { .. })
        ));
    }

    #[test]
    fn empty_projection_uses_table_default() {
        let spec = checked_table("doctors").expect("known");
        let projection = checked_projection(&spec, "  ").expect("default");
        assert_eq!(projection.to_string(), spec.projection);
    }

    #[test]
    fn malformed_projection_is_rejected() {
        let spec = checked_table("doctors").expect("known");
        assert!(checked_projection(&spec, "id,*").is_err());
    }

    #[test]
    fn payload_must_be_an_object() {
        let spec = checked_table("medicines").expect("known");
        assert!(checked_payload(&spec, r#"{"name":"Aspirin","stock":3}"#).is_ok());
        assert!(checked_payload(&spec, "[1,2]").is_err());
        assert!(checked_payload(&spec, "not json").is_err());
    }

    #[test]
    fn ids_are_validated() {
        assert_eq!(checked_id(" 42 ").expect("valid").as_str(), "42");
        assert!(checked_id("").is_err());
        assert!(checked_id("1&id=2").is_err());
    }
}
