//! Error types for the backend crate.
//!
//! Every variant names the table involved so a log line is enough to tell
//! which query failed.

use std::fmt;

/// Errors from data-source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The column projection is malformed.
    InvalidProjection { projection: String, reason: String },
    /// The table is not one the application knows about.
    UnknownTable { table: String },
    /// The request could not be sent or the connection failed.
    Request { table: String, reason: String },
    /// The request timed out.
    Timeout { table: String },
    /// The backend answered with a non-success status.
    Status {
        table: String,
        status: u16,
        body: String,
    },
    /// A row did not match the expected shape.
    Decode { table: String, reason: String },
    /// A write payload was not a JSON object.
    InvalidRow { table: String, reason: String },
    /// No row has the given id.
    NotFound { table: String, id: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProjection { projection, reason } => {
                write!(f, "invalid projection '{projection}': {reason}")
            }
            Self::UnknownTable { table } => write!(f, "unknown table '{table}'"),
            Self::Request { table, reason } => {
                write!(f, "request to '{table}' failed: {reason}")
            }
            Self::Timeout { table } => write!(f, "request to '{table}' timed out"),
            Self::Status {
                table,
                status,
                body,
            } => {
                write!(f, "'{table}' returned HTTP {status}: {body}")
            }
            Self::Decode { table, reason } => {
                write!(f, "unexpected row shape in '{table}': {reason}")
            }
            Self::InvalidRow { table, reason } => {
                write!(f, "invalid row for '{table}': {reason}")
            }
            Self::NotFound { table, id } => write!(f, "no row '{id}' in '{table}'"),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_code_and_body() {
        let err = BackendError::Status {
            table: "patients".to_string(),
            status: 401,
            body: "Invalid API key".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("patients"));
        assert!(text.contains("401"));
        assert!(text.contains("Invalid API key"));
    }

    #[test]
    fn not_found_display() {
        let err = BackendError::NotFound {
            table: "doctors".to_string(),
            id: "9".to_string(),
        };
        assert_eq!(err.to_string(), "no row '9' in 'doctors'");
    }
}
