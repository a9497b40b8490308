//! Domain error types for server operations.
//!
//! Server functions log these with full detail and hand the browser only
//! the user-safe message from `into_server_error`.

use leptos::server_fn::error::ServerFnError;
use std::fmt;

/// Errors from the data proxy server functions.
#[derive(Debug)]
pub enum DataError {
    /// The table is not one the application exposes.
    UnknownTable { table: String },
    /// The requested columns are malformed.
    InvalidProjection { projection: String, reason: String },
    /// A row or patch was not valid JSON.
    InvalidPayload { table: String, reason: String },
    /// A row id could not be parsed.
    InvalidId { id: String, reason: String },
    /// No data source was registered with the server.
    Unavailable,
    /// The data source rejected or failed the request.
    Backend { table: String, details: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTable { table } => write!(f, "unknown table '{}'", table),
            Self::InvalidProjection { projection, reason } => {
                write!(f, "invalid projection '{}': {}", projection, reason)
            }
            Self::InvalidPayload { table, reason } => {
                write!(f, "invalid payload for '{}': {}", table, reason)
            }
            Self::InvalidId { id, reason } => write!(f, "invalid id '{}': {}", id, reason),
            Self::Unavailable => write!(f, "no data source configured"),
            Self::Backend { table, details } => {
                write!(f, "backend error on '{}': {}", table, details)
            }
        }
    }
}

impl std::error::Error for DataError {}

impl DataError {
    /// Convert to a user-safe ServerFnError.
    pub fn into_server_error(self) -> ServerFnError {
        match &self {
            DataError::UnknownTable { .. } => ServerFnError::new("Unknown table"),
            DataError::InvalidProjection { .. } => ServerFnError::new("Invalid column list"),
            DataError::InvalidPayload { .. } => ServerFnError::new("Invalid record data"),
            DataError::InvalidId { .. } => ServerFnError::new("Invalid record ID"),
            DataError::Unavailable => ServerFnError::new("Data service unavailable"),
            DataError::Backend { .. } => {
                ServerFnError::new("The clinic database could not complete the request")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_details() {
        let err = DataError::Backend {
            table: "payments".to_string(),
            details: "'payments' returned HTTP 401: Invalid API key".to_string(),
        };
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn server_error_hides_details() {
        let err = DataError::Backend {
            table: "payments".to_string(),
            details: "secret-key rejected".to_string(),
        };
        let message = err.into_server_error().to_string();
        assert!(!message.contains("secret-key"));
    }

    #[test]
    fn unknown_table_message() {
        let message = DataError::UnknownTable {
            table: "users".to_string(),
        }
        .into_server_error()
        .to_string();
        assert!(message.contains("Unknown table"));
    }
}
