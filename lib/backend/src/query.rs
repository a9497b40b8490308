//! Stateful table reads.
//!
//! A [`TableQuery`] remembers the outcome of its last read as a
//! [`QueryState`]. Writes go straight to the data source and leave that state
//! alone; callers refetch when they want to see the change.

use crate::error::BackendError;
use crate::projection::{Order, Projection};
use crate::records::{Record, decode_one, decode_rows};
use crate::source::DataSource;
use medicare_core::{RecordId, Result};
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Outcome of the most recent read.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// A read is in flight, or none has completed yet.
    Loading,
    /// The last read failed.
    Error(String),
    /// The last read succeeded.
    Data(T),
}

impl<T> QueryState<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Reads and writes one table through a [`DataSource`].
pub struct TableQuery<T: Record> {
    source: Arc<dyn DataSource>,
    projection: std::result::Result<Projection, String>,
    state: Arc<RwLock<QueryState<Vec<T>>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for TableQuery<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            projection: self.projection.clone(),
            state: Arc::clone(&self.state),
            _record: PhantomData,
        }
    }
}

impl<T: Record> TableQuery<T> {
    /// Creates a query over `T::TABLE` with the record's default projection.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            projection: parse_projection(T::PROJECTION),
            state: Arc::new(RwLock::new(QueryState::Loading)),
            _record: PhantomData,
        }
    }

    /// Narrows the columns read.
    ///
    /// A malformed projection is not rejected here; every later read reports
    /// it as an [`QueryState::Error`].
    #[must_use]
    pub fn with_projection(mut self, projection: &str) -> Self {
        self.projection = parse_projection(projection);
        self
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> QueryState<Vec<T>> {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_state(&self, next: QueryState<Vec<T>>) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Reads the table newest-first and records the outcome.
    ///
    /// Failures land in the returned state rather than as an `Err`.
    pub async fn refetch(&self) -> QueryState<Vec<T>> {
        self.set_state(QueryState::Loading);

        let next = match self.fetch().await {
            Ok(rows) => {
                debug!(table = T::TABLE, rows = rows.len(), "Query refreshed");
                QueryState::Data(rows)
            }
            Err(message) => {
                warn!(table = T::TABLE, error = %message, "Query failed");
                QueryState::Error(message)
            }
        };

        self.set_state(next.clone());
        next
    }

    async fn fetch(&self) -> std::result::Result<Vec<T>, String> {
        let projection = self.projection.as_ref().map_err(String::clone)?;
        let rows = self
            .source
            .select(T::TABLE, projection, Order::newest_first())
            .await
            .map_err(|e| e.to_string())?;
        decode_rows::<T>(rows).map_err(|e| e.to_string())
    }

    /// Inserts a row and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns the data source's error, or `BackendError::Decode` if the
    /// stored row does not fit `T`.
    pub async fn create<P: Serialize + Sync>(&self, payload: &P) -> Result<T, BackendError> {
        let row = to_row::<T, P>(payload)?;
        let stored = self.source.insert(T::TABLE, row).await?;
        decode_one(stored)
    }

    /// Applies a partial update and returns the row as stored.
    ///
    /// # Errors
    ///
    /// Returns the data source's error, including `BackendError::NotFound`.
    pub async fn update<P: Serialize + Sync>(
        &self,
        id: &RecordId,
        patch: &P,
    ) -> Result<T, BackendError> {
        let patch = to_row::<T, P>(patch)?;
        let stored = self.source.update(T::TABLE, id, patch).await?;
        decode_one(stored)
    }

    /// Deletes a row.
    ///
    /// # Errors
    ///
    /// Returns the data source's error, including `BackendError::NotFound`.
    pub async fn delete(&self, id: &RecordId) -> Result<(), BackendError> {
        self.source.delete(T::TABLE, id).await
    }
}

fn parse_projection(projection: &str) -> std::result::Result<Projection, String> {
    Projection::parse(projection).map_err(|e| e.to_string())
}

fn to_row<T: Record, P: Serialize>(payload: &P) -> Result<serde_json::Value, BackendError> {
    serde_json::to_value(payload).map_err(|e| {
        BackendError::InvalidRow {
            table: T::TABLE.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use crate::records::{Medicine, MedicineStockPatch, NewMedicine, NewPatient, Patient};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{Value, json};

    /// Patient columns shown in a directory listing.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct PatientSummary {
        id: RecordId,
        name: String,
        email: String,
    }

    impl Record for PatientSummary {
        const TABLE: &'static str = "patients";
        const PROJECTION: &'static str = "id,name,email";

        fn id(&self) -> &RecordId {
            &self.id
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DataSource for FailingSource {
        async fn select(
            &self,
            table: &str,
            _projection: &Projection,
            _order: Order,
        ) -> Result<Vec<Value>, BackendError> {
            Err(BackendError::Status {
                table: table.to_string(),
                status: 401,
                body: "Invalid API key".to_string(),
            }
            .into())
        }

        async fn insert(&self, table: &str, _row: Value) -> Result<Value, BackendError> {
            Err(BackendError::Timeout {
                table: table.to_string(),
            }
            .into())
        }

        async fn update(
            &self,
            table: &str,
            _id: &RecordId,
            _patch: Value,
        ) -> Result<Value, BackendError> {
            Err(BackendError::Timeout {
                table: table.to_string(),
            }
            .into())
        }

        async fn delete(&self, table: &str, _id: &RecordId) -> Result<(), BackendError> {
            Err(BackendError::Timeout {
                table: table.to_string(),
            }
            .into())
        }
    }

    fn patient(name: &str, email: &str, created_at: &str) -> Value {
        json!({"name": name, "email": email, "phone": "555-0000", "created_at": created_at})
    }

    #[tokio::test]
    async fn starts_loading() {
        let query = TableQuery::<Patient>::new(Arc::new(MemorySource::new()));
        assert!(query.state().is_loading());
    }

    #[tokio::test]
    async fn projected_patients_newest_first_then_refetch_sees_insert() {
        let source = MemorySource::new();
        source
            .insert("patients", patient("Ann", "ann@x.y", "2026-10-01T08:00:00Z"))
            .await
            .expect("insert");
        source
            .insert("patients", patient("Bo", "bo@x.y", "2026-10-02T08:00:00Z"))
            .await
            .expect("insert");

        let query = TableQuery::<PatientSummary>::new(Arc::new(source.clone()));
        let state = query.refetch().await;
        let rows = state.data().expect("data");
        let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Ann"]);
        assert_eq!(query.state(), state);

        source
            .insert("patients", patient("Cy", "cy@x.y", "2026-10-03T08:00:00Z"))
            .await
            .expect("external insert");
        assert_eq!(query.state().data().map(Vec::len), Some(2));

        let refreshed = query.refetch().await;
        let rows = refreshed.data().expect("data");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Cy");
    }

    #[tokio::test]
    async fn projection_limits_columns() {
        let source = MemorySource::new();
        source
            .insert("patients", patient("Ann", "ann@x.y", "2026-10-01T08:00:00Z"))
            .await
            .expect("insert");

        // Patient requires created_at, which this projection drops.
        let query = TableQuery::<Patient>::new(Arc::new(source)).with_projection("id,name,email");
        let state = query.refetch().await;
        let message = state.error().expect("decode error");
        assert!(message.contains("patients"));
    }

    #[tokio::test]
    async fn malformed_projection_is_an_error_state() {
        let query =
            TableQuery::<Patient>::new(Arc::new(MemorySource::new())).with_projection("id,,name");
        let state = query.refetch().await;
        assert!(state.error().expect("error").contains("id,,name"));
    }

    #[tokio::test]
    async fn source_failure_is_an_error_state() {
        let query = TableQuery::<Patient>::new(Arc::new(FailingSource));
        let state = query.refetch().await;
        let message = state.error().expect("error");
        assert!(message.contains("401"));
        assert_eq!(query.state(), state);
    }

    #[tokio::test]
    async fn writes_leave_state_untouched() {
        let source: Arc<dyn DataSource> = Arc::new(MemorySource::new());
        let query = TableQuery::<Medicine>::new(source);
        query.refetch().await;
        let before = query.state();
        assert_eq!(before.data().map(Vec::len), Some(0));

        let created = query
            .create(&NewMedicine {
                name: "Aspirin".to_string(),
                manufacturer: None,
                price: Some(2.0),
                stock: 10,
            })
            .await
            .expect("create");
        assert_eq!(created.stock, 10);
        assert_eq!(query.state(), before);

        let updated = query
            .update(&created.id, &MedicineStockPatch { stock: 4 })
            .await
            .expect("update");
        assert_eq!(updated.stock, 4);
        assert_eq!(query.state(), before);

        query.delete(&created.id).await.expect("delete");
        assert_eq!(query.state(), before);
        assert!(query.delete(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn write_failures_surface_to_the_caller() {
        let query = TableQuery::<Patient>::new(Arc::new(FailingSource));
        let err = query
            .create(&NewPatient {
                name: "Ann".to_string(),
                email: "ann@x.y".to_string(),
                phone: None,
                date_of_birth: None,
                gender: None,
                address: None,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(query.state().is_loading());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let query = TableQuery::<Medicine>::new(Arc::new(MemorySource::new()));
        let other = query.clone();
        query.refetch().await;
        assert!(other.state().data().is_some());
    }
}
