//! In-process tables implementing [`DataSource`].
//!
//! Used by tests and by the server when no hosted backend is configured.
//! Inserted rows get a ULID `id` and a `created_at` timestamp unless the
//! payload already carries them. Clones share the same tables.

use crate::error::BackendError;
use crate::projection::{CREATED_AT, Order, Projection};
use crate::records::table_spec;
use crate::source::DataSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use medicare_core::{RecordId, Result};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};
use tracing::debug;
use ulid::Ulid;

#[derive(Debug, Clone)]
struct StoredRow {
    /// Insertion sequence, breaks ties between equal timestamps.
    seq: u64,
    data: Map<String, Value>,
}

/// Tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: Arc<RwLock<HashMap<String, Vec<StoredRow>>>>,
    sequence: Arc<AtomicU64>,
}

impl MemorySource {
    /// Creates a source with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-populated with a small clinic.
    ///
    /// Row ids line up with the demo login accounts so that patient and
    /// doctor dashboards have something to show.
    ///
    /// # Errors
    ///
    /// Only fails if the seed rows below are edited into non-objects.
    pub fn with_demo_data() -> Result<Self, BackendError> {
        let source = Self::new();
        let now = Utc::now();
        let at = |hours_ago: i64| (now - Duration::hours(hours_ago)).to_rfc3339();

        let seed: [(&str, Value); 17] = [
            (
                "patients",
                json!({
                    "id": "demo-patient",
                    "name": "Pat Demo",
                    "email": "patient@demo.com",
                    "phone": "555-0100",
                    "gender": "female",
                    "created_at": at(720)
                }),
            ),
            (
                "patients",
                json!({
                    "id": "p-ruiz",
                    "name": "Marco Ruiz",
                    "email": "marco.ruiz@example.com",
                    "date_of_birth": "1984-03-12",
                    "created_at": at(240)
                }),
            ),
            (
                "patients",
                json!({
                    "id": "p-okafor",
                    "name": "Ada Okafor",
                    "email": "ada.okafor@example.com",
                    "phone": "555-0142",
                    "created_at": at(48)
                }),
            ),
            (
                "doctors",
                json!({
                    "id": "demo-doctor",
                    "name": "Dr. Dana Demo",
                    "email": "doctor@demo.com",
                    "specialty": "General Medicine",
                    "department": "Outpatient",
                    "created_at": at(2000)
                }),
            ),
            (
                "doctors",
                json!({
                    "id": "d-chen",
                    "name": "Dr. Wei Chen",
                    "email": "wei.chen@example.com",
                    "specialty": "Cardiology",
                    "department": "Cardiology",
                    "created_at": at(1500)
                }),
            ),
            (
                "doctors",
                json!({
                    "id": "d-haddad",
                    "name": "Dr. Lina Haddad",
                    "email": "lina.haddad@example.com",
                    "specialty": "Pediatrics",
                    "created_at": at(900)
                }),
            ),
            (
                "medicines",
                json!({
                    "id": "m-amox",
                    "name": "Amoxicillin 500mg",
                    "manufacturer": "Generic Labs",
                    "price": 8.5,
                    "stock": 120,
                    "created_at": at(1000)
                }),
            ),
            (
                "medicines",
                json!({
                    "id": "m-ibu",
                    "name": "Ibuprofen 200mg",
                    "manufacturer": "Acme Pharma",
                    "price": 3.25,
                    "stock": 300,
                    "created_at": at(800)
                }),
            ),
            (
                "medicines",
                json!({
                    "id": "m-lisin",
                    "name": "Lisinopril 10mg",
                    "price": 6.0,
                    "stock": 45,
                    "created_at": at(100)
                }),
            ),
            (
                "appointments",
                json!({
                    "patient_id": "demo-patient",
                    "doctor_id": "demo-doctor",
                    "scheduled_for": at(-48),
                    "reason": "Annual check-up",
                    "status": "scheduled",
                    "created_at": at(24)
                }),
            ),
            (
                "appointments",
                json!({
                    "patient_id": "demo-patient",
                    "doctor_id": "d-chen",
                    "scheduled_for": at(168),
                    "reason": "Palpitations",
                    "status": "completed",
                    "created_at": at(200)
                }),
            ),
            (
                "appointments",
                json!({
                    "patient_id": "p-okafor",
                    "doctor_id": "demo-doctor",
                    "scheduled_for": at(-72),
                    "status": "scheduled",
                    "created_at": at(12)
                }),
            ),
            (
                "prescriptions",
                json!({
                    "patient_id": "demo-patient",
                    "doctor_id": "d-chen",
                    "medicine_id": "m-lisin",
                    "medication": "Lisinopril 10mg",
                    "dosage": "1 tablet daily",
                    "instructions": "Take in the morning",
                    "created_at": at(160)
                }),
            ),
            (
                "payments",
                json!({
                    "patient_id": "demo-patient",
                    "amount": 45.0,
                    "method": "card",
                    "status": "paid",
                    "created_at": at(160)
                }),
            ),
            (
                "payments",
                json!({
                    "patient_id": "demo-patient",
                    "amount": 30.0,
                    "status": "pending",
                    "created_at": at(20)
                }),
            ),
            (
                "patient_history",
                json!({
                    "patient_id": "demo-patient",
                    "condition": "Hypertension",
                    "notes": "Monitoring blood pressure monthly",
                    "recorded_by": "d-chen",
                    "created_at": at(160)
                }),
            ),
            (
                "patient_history",
                json!({
                    "patient_id": "p-ruiz",
                    "condition": "Seasonal allergies",
                    "recorded_by": "demo-doctor",
                    "created_at": at(230)
                }),
            ),
        ];

        for (table, row) in seed {
            source.store(table, row)?;
        }
        Ok(source)
    }

    fn store(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        known_table(table)?;
        let Value::Object(mut data) = row else {
            return Err(BackendError::InvalidRow {
                table: table.to_string(),
                reason: "row must be a JSON object".to_string(),
            }
            .into());
        };

        if !data.contains_key("id") {
            data.insert("id".to_string(), Value::String(Ulid::new().to_string()));
        }
        if !data.contains_key(CREATED_AT) {
            data.insert(CREATED_AT.to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        let seq = self.sequence.fetch_add(1, AtomicOrdering::Relaxed);
        let mut tables = self.write_tables(table)?;
        tables.entry(table.to_string()).or_default().push(StoredRow {
            seq,
            data: data.clone(),
        });
        Ok(Value::Object(data))
    }

    fn write_tables(
        &self,
        table: &str,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<StoredRow>>>, BackendError>
    {
        self.tables.write().map_err(|e| {
            BackendError::Request {
                table: table.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn not_found(table: &str, id: &RecordId) -> BackendError {
        BackendError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }
}

/// Rejects tables the application does not declare, as the hosted backend would.
fn known_table(table: &str) -> Result<(), BackendError> {
    if table_spec(table).is_none() {
        return Err(BackendError::UnknownTable {
            table: table.to_string(),
        }
        .into());
    }
    Ok(())
}

fn id_matches(row: &Map<String, Value>, id: &RecordId) -> bool {
    match row.get("id") {
        Some(Value::String(s)) => s == id.as_str(),
        Some(Value::Number(n)) => n.to_string() == id.as_str(),
        _ => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DataSource for MemorySource {
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        order: Order,
    ) -> Result<Vec<Value>, BackendError> {
        known_table(table)?;
        let mut rows = {
            let tables = self.tables.read().map_err(|e| BackendError::Request {
                table: table.to_string(),
                reason: e.to_string(),
            })?;
            tables.get(table).cloned().unwrap_or_default()
        };

        rows.sort_by(|a, b| {
            let ordering = compare_values(a.data.get(order.column), b.data.get(order.column))
                .then(a.seq.cmp(&b.seq));
            if order.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        debug!(table, rows = rows.len(), "memory select");
        Ok(rows
            .iter()
            .map(|row| Value::Object(projection.apply(&row.data)))
            .collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        self.store(table, row)
    }

    async fn update(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Result<Value, BackendError> {
        known_table(table)?;
        let Value::Object(mut patch) = patch else {
            return Err(BackendError::InvalidRow {
                table: table.to_string(),
                reason: "patch must be a JSON object".to_string(),
            }
            .into());
        };
        patch.remove("id");

        let mut tables = self.write_tables(table)?;
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| id_matches(&row.data, id)))
            .ok_or_else(|| Self::not_found(table, id))?;

        for (column, value) in patch {
            row.data.insert(column, value);
        }
        Ok(Value::Object(row.data.clone()))
    }

    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), BackendError> {
        known_table(table)?;
        let mut tables = self.write_tables(table)?;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| Self::not_found(table, id))?;
        let before = rows.len();
        rows.retain(|row| !id_matches(&row.data, id));
        if rows.len() == before {
            return Err(Self::not_found(table, id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Appointment, Patient, Record, TABLES, decode_rows};

    fn all_columns(table: &str) -> Projection {
        let spec = TABLES
            .iter()
            .find(|s| s.table == table)
            .expect("known table");
        Projection::parse(spec.projection).expect("valid")
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let source = MemorySource::new();
        let row = source
            .insert("patients", json!({"name": "Ann", "email": "ann@x.y"}))
            .await
            .expect("insert");
        assert!(row["id"].is_string());
        assert!(row[CREATED_AT].is_string());
    }

    #[tokio::test]
    async fn insert_rejects_non_objects() {
        let source = MemorySource::new();
        assert!(source.insert("patients", json!([1, 2])).await.is_err());
    }

    #[tokio::test]
    async fn select_orders_newest_first() {
        let source = MemorySource::new();
        for (name, created) in [
            ("old", "2026-01-01T00:00:00Z"),
            ("new", "2026-03-01T00:00:00Z"),
            ("mid", "2026-02-01T00:00:00+00:00"),
        ] {
            source
                .insert("patients", json!({"name": name, "email": "x", "created_at": created}))
                .await
                .expect("insert");
        }

        let projection = Projection::parse("name").expect("valid");
        let rows = source
            .select("patients", &projection, Order::newest_first())
            .await
            .expect("select");
        let names: Vec<&str> = rows.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_insertion_order() {
        let source = MemorySource::new();
        for name in ["first", "second"] {
            source
                .insert(
                    "patients",
                    json!({"name": name, "email": "x", "created_at": "2026-01-01T00:00:00Z"}),
                )
                .await
                .expect("insert");
        }
        let rows = source
            .select(
                "patients",
                &Projection::parse("name").expect("valid"),
                Order::newest_first(),
            )
            .await
            .expect("select");
        assert_eq!(rows[0]["name"], "second");
    }

    #[tokio::test]
    async fn select_missing_table_is_empty() {
        let rows = MemorySource::new()
            .select(
                "medicines",
                &Projection::parse("id").expect("valid"),
                Order::newest_first(),
            )
            .await
            .expect("select");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn unknown_tables_are_rejected() {
        let source = MemorySource::new();
        let err = source
            .insert("users", json!({"name": "Mallory"}))
            .await
            .expect_err("insert");
        assert!(err.to_string().contains("unknown table 'users'"));

        let err = source
            .select(
                "users",
                &Projection::parse("id").expect("valid"),
                Order::newest_first(),
            )
            .await
            .expect_err("select");
        assert!(err.to_string().contains("unknown table 'users'"));

        let id = RecordId::new("1");
        assert!(source.update("users", &id, json!({})).await.is_err());
        assert!(source.delete("users", &id).await.is_err());
    }

    #[tokio::test]
    async fn update_merges_and_keeps_id() {
        let source = MemorySource::new();
        let row = source
            .insert("medicines", json!({"id": 5, "name": "Aspirin", "stock": 1}))
            .await
            .expect("insert");
        assert_eq!(row["id"], 5);

        let updated = source
            .update(
                "medicines",
                &RecordId::new("5"),
                json!({"id": 99, "stock": 10}),
            )
            .await
            .expect("update");
        assert_eq!(updated["id"], 5);
        assert_eq!(updated["stock"], 10);
        assert_eq!(updated["name"], "Aspirin");
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows_fail() {
        let source = MemorySource::new();
        let id = RecordId::new("nope");
        assert!(source.update("doctors", &id, json!({})).await.is_err());
        assert!(source.delete("doctors", &id).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let source = MemorySource::new();
        let row = source
            .insert("doctors", json!({"name": "Dr. A"}))
            .await
            .expect("insert");
        let id: RecordId = serde_json::from_value(row["id"].clone()).expect("id");
        source.delete("doctors", &id).await.expect("delete");

        let rows = source
            .select(
                "doctors",
                &Projection::parse("id").expect("valid"),
                Order::newest_first(),
            )
            .await
            .expect("select");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn demo_data_decodes_into_records() {
        let source = MemorySource::with_demo_data().expect("seed");

        let patients = source
            .select(
                Patient::TABLE,
                &all_columns(Patient::TABLE),
                Order::newest_first(),
            )
            .await
            .expect("select");
        let patients: Vec<Patient> = decode_rows(patients).expect("decode");
        assert!(patients.iter().any(|p| p.id.as_str() == "demo-patient"));

        let appointments = source
            .select(
                Appointment::TABLE,
                &all_columns(Appointment::TABLE),
                Order::newest_first(),
            )
            .await
            .expect("select");
        let appointments: Vec<Appointment> = decode_rows(appointments).expect("decode");
        assert_eq!(appointments.len(), 3);
        assert!(appointments.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn demo_data_covers_every_table() {
        let source = MemorySource::with_demo_data().expect("seed");
        for spec in TABLES {
            let rows = source
                .select(spec.table, &all_columns(spec.table), Order::newest_first())
                .await
                .expect("select");
            assert!(!rows.is_empty(), "{} is empty", spec.table);
        }
    }
}
