//! [`DataSource`] over the hosted backend's REST interface.
//!
//! The backend exposes each table at `{url}/rest/v1/{table}` with
//! PostgREST query syntax. Every request carries the published key both as
//! `apikey` and as a bearer token.

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::projection::{Order, Projection};
use crate::source::DataSource;
use async_trait::async_trait;
use medicare_core::{RecordId, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Asks the backend to echo written rows back.
const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Client for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestSource {
    client: Client,
    config: BackendConfig,
}

impl RestSource {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Request` if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BackendError::Request {
                table: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
    }

    /// Sends a request and decodes the JSON array the backend answers with.
    async fn rows(&self, table: &str, request: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            tracing::warn!(error = %e, table, "Backend request failed");
            if e.is_timeout() {
                BackendError::Timeout {
                    table: table.to_string(),
                }
            } else {
                BackendError::Request {
                    table: table.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(table, status = %status, body = %body, "Backend returned error");
            return Err(BackendError::Status {
                table: table.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let rows: Vec<Value> = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, table, "Failed to parse backend response");
            BackendError::Decode {
                table: table.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(rows)
    }

    /// Like [`Self::rows`] but for writes that touch exactly one row.
    async fn single_row(
        &self,
        table: &str,
        id: Option<&RecordId>,
        request: RequestBuilder,
    ) -> Result<Value, BackendError> {
        let rows = self.rows(table, request).await?;
        let Some(row) = rows.into_iter().next() else {
            let err = match id {
                Some(id) => BackendError::NotFound {
                    table: table.to_string(),
                    id: id.to_string(),
                },
                None => BackendError::Decode {
                    table: table.to_string(),
                    reason: "write returned no rows".to_string(),
                },
            };
            return Err(err.into());
        };
        Ok(row)
    }

    fn id_filter(id: &RecordId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DataSource for RestSource {
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        order: Order,
    ) -> Result<Vec<Value>, BackendError> {
        let request = self.client.get(self.config.table_url(table)).query(&[
            ("select", projection.to_string()),
            ("order", order.to_query()),
        ]);
        let rows = self.rows(table, request).await?;
        tracing::debug!(table, rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        if !row.is_object() {
            return Err(BackendError::InvalidRow {
                table: table.to_string(),
                reason: "row must be a JSON object".to_string(),
            }
            .into());
        }
        let request = self
            .client
            .post(self.config.table_url(table))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&row);
        self.single_row(table, None, request).await
    }

    async fn update(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Result<Value, BackendError> {
        if !patch.is_object() {
            return Err(BackendError::InvalidRow {
                table: table.to_string(),
                reason: "patch must be a JSON object".to_string(),
            }
            .into());
        }
        let request = self
            .client
            .patch(self.config.table_url(table))
            .query(&Self::id_filter(id))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&patch);
        self.single_row(table, Some(id), request).await
    }

    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), BackendError> {
        let request = self
            .client
            .delete(self.config.table_url(table))
            .query(&Self::id_filter(id))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1);
        self.single_row(table, Some(id), request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_configured_timeout() {
        let mut config = BackendConfig::new("https://clinic.example.com/", "anon");
        config.timeout_seconds = 3;
        let source = RestSource::new(config).expect("client");
        assert_eq!(
            source.config.table_url("doctors"),
            "https://clinic.example.com/rest/v1/doctors"
        );
    }

    #[test]
    fn id_filter_uses_equality_operator() {
        let [(column, value)] = RestSource::id_filter(&RecordId::new("42"));
        assert_eq!(column, "id");
        assert_eq!(value, "eq.42");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        let mut config = BackendConfig::new("http://127.0.0.1:9", "anon");
        config.timeout_seconds = 2;
        let source = RestSource::new(config).expect("client");
        let projection = Projection::parse("id").expect("valid");
        let err = source
            .select("patients", &projection, Order::newest_first())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("patients"));
    }
}
