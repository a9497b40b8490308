//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticationError`: Login failures
//! - `StorageError`: Durable storage failures
//! - `RouteError`: Invalid route table declarations

use std::fmt;

/// Errors from authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Email, password, or selected role did not match an account.
    ///
    /// Deliberately carries no detail: a wrong password and a wrong role
    /// produce the same outcome.
    InvalidCredentials,
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from durable storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The storage area could not be reached (no window, access denied).
    Unavailable { reason: String },
    /// A write was rejected (quota exceeded, private mode).
    WriteFailed { key: String, reason: String },
    /// A value could not be encoded for storage.
    Encode { key: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "durable storage unavailable: {reason}")
            }
            Self::WriteFailed { key, reason } => {
                write!(f, "failed to write '{key}': {reason}")
            }
            Self::Encode { key, reason } => {
                write!(f, "failed to encode value for '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Errors from route table declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A protected route declared no allowed roles.
    EmptyAllowList,
    /// A protected route listed the guest role, which never holds a session.
    GuestNotAllowed,
    /// The same path pattern was declared twice.
    DuplicatePath { path: String },
    /// The path pattern is malformed.
    InvalidPattern { path: String, reason: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAllowList => {
                write!(f, "protected route must allow at least one role")
            }
            Self::GuestNotAllowed => {
                write!(f, "protected route cannot allow the guest role")
            }
            Self::DuplicatePath { path } => {
                write!(f, "route '{path}' is declared more than once")
            }
            Self::InvalidPattern { path, reason } => {
                write!(f, "invalid route pattern '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_display_is_generic() {
        let err = AuthenticationError::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn storage_write_failed_display() {
        let err = StorageError::WriteFailed {
            key: "medicare_auth".to_string(),
            reason: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("medicare_auth"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn route_duplicate_display() {
        let err = RouteError::DuplicatePath {
            path: "/doctors".to_string(),
        };
        assert!(err.to_string().contains("/doctors"));
    }
}
