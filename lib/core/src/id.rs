//! Opaque identifiers for rows held by the hosted backend.
//!
//! The backend assigns identifiers itself. Depending on the table they arrive
//! as UUID strings or as integers, so `RecordId` keeps them as an opaque string
//! and accepts both shapes when decoding.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse record id: {}", self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Identifier of a backend row (patient, doctor, appointment, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an ID from an already-validated string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                reason: "id is empty".to_string(),
            });
        }
        if trimmed.contains(['&', '=', ',', '?', '#', '/']) {
            return Err(ParseIdError {
                reason: format!("id '{trimmed}' contains reserved characters"),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Signed(n) => Ok(Self(n.to_string())),
            Raw::Unsigned(n) => Ok(Self(n.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id: RecordId = "  abc-123 ".parse().expect("should parse");
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn parse_rejects_empty() {
        let result: Result<RecordId, _> = "   ".parse();
        assert!(result.is_err());
    }

    #[test]
    fn parse_rejects_filter_syntax() {
        let result: Result<RecordId, _> = "1&role=eq.admin".parse();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn decodes_integer_ids() {
        let id: RecordId = serde_json::from_str("42").expect("deserialize");
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn decodes_uuid_ids() {
        let id: RecordId =
            serde_json::from_str("\"7d9f0a7e-2b1c-4c1e-9d38-0a6f1d3c5b21\"").expect("deserialize");
        assert_eq!(id.to_string(), "7d9f0a7e-2b1c-4c1e-9d38-0a6f1d3c5b21");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&RecordId::new("17")).expect("serialize");
        assert_eq!(json, "\"17\"");
    }

    #[test]
    fn rejects_non_scalar_ids() {
        let result: Result<RecordId, _> = serde_json::from_str("{\"id\": 1}");
        assert!(result.is_err());
    }
}
