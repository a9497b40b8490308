//! Reactive bindings for table queries.

use crate::data::ServerFnSource;
use leptos::prelude::*;
use medicare_backend::{QueryState, Record, TableQuery};
use serde::Serialize;
use std::sync::Arc;

/// A table query owned by the component that created it.
///
/// The read runs in the browser once the component mounts and again on
/// every [`TableHandle::refetch`]. Writes never refresh the read; call
/// `refetch` after one succeeds.
pub struct TableHandle<T: Record> {
    query: StoredValue<TableQuery<T>>,
    version: RwSignal<u64>,
    state: LocalResource<QueryState<Vec<T>>>,
}

impl<T: Record> Clone for TableHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Record> Copy for TableHandle<T> {}

impl<T: Record> TableHandle<T> {
    /// Returns the current state; reading it subscribes the caller.
    pub fn state(&self) -> QueryState<Vec<T>> {
        self.state.get().unwrap_or(QueryState::Loading)
    }

    /// Re-runs the read.
    pub fn refetch(&self) {
        self.version.update(|v| *v += 1);
    }

    /// Inserts a row.
    pub async fn create<P: Serialize + Sync>(self, payload: P) -> Result<T, String> {
        let query = self.query.get_value();
        query.create(&payload).await.map_err(|e| e.to_string())
    }

    /// Applies a partial update to one row.
    pub async fn update<P: Serialize + Sync>(
        self,
        id: medicare_core::RecordId,
        patch: P,
    ) -> Result<T, String> {
        let query = self.query.get_value();
        query.update(&id, &patch).await.map_err(|e| e.to_string())
    }

    /// Deletes one row.
    pub async fn delete(self, id: medicare_core::RecordId) -> Result<(), String> {
        let query = self.query.get_value();
        query.delete(&id).await.map_err(|e| e.to_string())
    }
}

/// Reads `T::TABLE` with the record's default columns.
pub fn use_table<T: Record>() -> TableHandle<T> {
    bind(TableQuery::new(Arc::new(ServerFnSource)))
}

/// Patient columns needed for pickers and name lookups.
pub const PATIENT_NAMES: &str = "id,name,email,created_at";

/// Reads `T::TABLE` with a narrower column list.
pub fn use_table_projected<T: Record>(projection: &str) -> TableHandle<T> {
    bind(TableQuery::new(Arc::new(ServerFnSource)).with_projection(projection))
}

fn bind<T: Record>(query: TableQuery<T>) -> TableHandle<T> {
    let query = StoredValue::new(query);
    let version = RwSignal::new(0_u64);
    let state = LocalResource::new(move || {
        version.track();
        let query = query.get_value();
        async move { query.refetch().await }
    });

    TableHandle {
        query,
        version,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medicare_backend::{MemorySource, Projection};
    use medicare_backend::records::{NewPatient, Patient};

    #[tokio::test]
    async fn patient_names_projection_decodes_patients() {
        assert!(Projection::parse(PATIENT_NAMES).is_ok());

        let source = Arc::new(MemorySource::new());
        let query = TableQuery::<Patient>::new(source).with_projection(PATIENT_NAMES);
        query
            .create(&NewPatient {
                name: "Ana Ruiz".to_string(),
                email: "ana@example.com".to_string(),
                phone: Some("555-0100".to_string()),
                date_of_birth: None,
                gender: None,
                address: None,
            })
            .await
            .expect("insert");

        let state = query.refetch().await;
        let rows = state.data().expect("data");
        assert_eq!(rows[0].name, "Ana Ruiz");
        assert_eq!(rows[0].phone, None);
    }
}
