//! Typed row contracts for the clinic tables.
//!
//! Each record type names its table and the projection it is read with.
//! Rows are decoded into these types as they leave the data source, so a
//! column that changed shape surfaces as a decode error instead of a blank
//! cell in the UI.

use crate::error::BackendError;
use chrono::{DateTime, Utc};
use medicare_core::{RecordId, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A row type read from a known table.
pub trait Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Table the rows live in.
    const TABLE: &'static str;
    /// Columns requested when no projection is given.
    const PROJECTION: &'static str;

    /// Returns the row's id.
    fn id(&self) -> &RecordId;
}

/// A table the application may read and write, with its default projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub table: &'static str,
    pub projection: &'static str,
}

const fn spec<T: Record>() -> TableSpec {
    TableSpec {
        table: T::TABLE,
        projection: T::PROJECTION,
    }
}

/// Every table the application knows.
pub const TABLES: [TableSpec; 7] = [
    spec::<Patient>(),
    spec::<Doctor>(),
    spec::<Appointment>(),
    spec::<Prescription>(),
    spec::<Payment>(),
    spec::<Medicine>(),
    spec::<HistoryEntry>(),
];

/// Looks up a known table by name.
#[must_use]
pub fn table_spec(table: &str) -> Option<TableSpec> {
    TABLES.iter().copied().find(|spec| spec.table == table)
}

/// Decodes raw rows into a record type.
///
/// # Errors
///
/// Returns `BackendError::Decode` naming the first row that does not fit.
pub fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, BackendError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| decode_row(row).map_err(|e| with_index(e, index)))
        .collect::<std::result::Result<Vec<T>, BackendError>>()
        .map_err(Into::into)
}

/// Decodes a single row, such as one returned by an insert.
///
/// # Errors
///
/// Returns `BackendError::Decode` if the row does not fit `T`.
pub fn decode_one<T: Record>(row: Value) -> Result<T, BackendError> {
    Ok(decode_row(row)?)
}

fn decode_row<T: Record>(row: Value) -> std::result::Result<T, BackendError> {
    serde_json::from_value(row).map_err(|e| BackendError::Decode {
        table: T::TABLE.to_string(),
        reason: e.to_string(),
    })
}

fn with_index(err: BackendError, index: usize) -> BackendError {
    match err {
        BackendError::Decode { table, reason } => BackendError::Decode {
            table,
            reason: format!("row {index}: {reason}"),
        },
        other => other,
    }
}

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Patient {
    const TABLE: &'static str = "patients";
    const PROJECTION: &'static str = "id,name,email,phone,date_of_birth,gender,address,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// A doctor on staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub specialty: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Doctor {
    const TABLE: &'static str = "doctors";
    const PROJECTION: &'static str = "id,name,email,specialty,department,phone,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Lifecycle of an appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Appointment {
    const TABLE: &'static str = "appointments";
    const PROJECTION: &'static str =
        "id,patient_id,doctor_id,scheduled_for,reason,status,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// A prescription written by a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    #[serde(default)]
    pub medicine_id: Option<RecordId>,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Prescription {
    const TABLE: &'static str = "prescriptions";
    const PROJECTION: &'static str =
        "id,patient_id,doctor_id,medicine_id,medication,dosage,instructions,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A charge against a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    pub patient_id: RecordId,
    #[serde(default)]
    pub appointment_id: Option<RecordId>,
    pub amount: f64,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Payment {
    const TABLE: &'static str = "payments";
    const PROJECTION: &'static str = "id,patient_id,appointment_id,amount,method,status,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// A medicine in the clinic's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    pub created_at: DateTime<Utc>,
}

impl Record for Medicine {
    const TABLE: &'static str = "medicines";
    const PROJECTION: &'static str = "id,name,manufacturer,price,stock,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// An entry in a patient's medical history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub condition: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recorded_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl Record for HistoryEntry {
    const TABLE: &'static str = "patient_history";
    const PROJECTION: &'static str = "id,patient_id,condition,notes,recorded_by,created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Insert payload for `patients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Insert payload for `doctors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub specialty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Insert payload for `appointments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    pub scheduled_for: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

/// Status change for an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStatusPatch {
    pub status: AppointmentStatus,
}

/// Insert payload for `prescriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrescription {
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicine_id: Option<RecordId>,
    pub medication: String,
    pub dosage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Insert payload for `payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub patient_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<RecordId>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub status: PaymentStatus,
}

/// Status change for a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusPatch {
    pub status: PaymentStatus,
}

/// Insert payload for `medicines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub stock: i64,
}

/// Stock adjustment for a medicine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineStockPatch {
    pub stock: i64,
}

/// Insert payload for `patient_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub patient_id: RecordId,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<RecordId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Projection;
    use serde_json::json;

    #[test]
    fn every_default_projection_is_valid() {
        for spec in TABLES {
            let projection = Projection::parse(spec.projection).expect("valid projection");
            assert!(
                projection.columns().iter().any(|c| c == "id"),
                "{} must project id",
                spec.table
            );
            assert!(
                projection.columns().iter().any(|c| c == "created_at"),
                "{} must project created_at",
                spec.table
            );
        }
    }

    #[test]
    fn table_lookup() {
        assert_eq!(
            table_spec("patient_history").map(|s| s.projection),
            Some(HistoryEntry::PROJECTION)
        );
        assert!(table_spec("users").is_none());
    }

    #[test]
    fn decodes_backend_rows() {
        let rows = vec![json!({
            "id": 3,
            "patient_id": "demo-patient",
            "doctor_id": 7,
            "scheduled_for": "2026-10-20T09:30:00+00:00",
            "reason": null,
            "status": "completed",
            "created_at": "2026-10-01T12:00:00.123456+00:00"
        })];
        let appointments: Vec<Appointment> = decode_rows(rows).expect("decode");
        assert_eq!(appointments[0].id.as_str(), "3");
        assert_eq!(appointments[0].doctor_id.as_str(), "7");
        assert_eq!(appointments[0].status, AppointmentStatus::Completed);
        assert!(appointments[0].reason.is_none());
    }

    #[test]
    fn decode_error_names_table_and_row() {
        let rows = vec![
            json!({"id": 1, "name": "Aspirin", "stock": 3, "created_at": "2026-10-01T00:00:00Z"}),
            json!({
                "id": 2,
                "name": "Ibuprofen",
                "stock": "lots",
                "created_at": "2026-10-01T00:00:00Z"
            }),
        ];
        let err = decode_rows::<Medicine>(rows).unwrap_err().to_string();
        assert!(err.contains("medicines"));
        assert!(err.contains("row 1"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let row = json!({
            "id": 1, "patient_id": 1, "amount": 10.0, "status": "stolen",
            "created_at": "2026-10-01T00:00:00Z"
        });
        assert!(decode_one::<Payment>(row).is_err());
    }

    #[test]
    fn insert_payload_omits_empty_optionals() {
        let payload = serde_json::to_value(NewMedicine {
            name: "Amoxicillin".to_string(),
            manufacturer: None,
            price: Some(4.5),
            stock: 20,
        })
        .expect("serialize");
        assert_eq!(
            payload,
            json!({"name": "Amoxicillin", "price": 4.5, "stock": 20})
        );
    }
}
