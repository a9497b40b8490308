//! Column projections and result ordering.

use crate::error::BackendError;
use medicare_core::Result;
use serde_json::{Map, Value};
use std::fmt;

/// Column every table is ordered by.
pub const CREATED_AT: &str = "created_at";

/// A validated, comma-separated list of columns to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    /// Parses a projection string such as `"id,name,email"`.
    ///
    /// Whitespace around column names is ignored.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidProjection` for an empty list, empty or
    /// duplicate columns, wildcards, or characters outside `[A-Za-z0-9_]`.
    pub fn parse(projection: &str) -> Result<Self, BackendError> {
        let invalid = |reason: String| BackendError::InvalidProjection {
            projection: projection.to_string(),
            reason,
        };

        let mut columns: Vec<String> = Vec::new();
        for column in projection.split(',').map(str::trim) {
            if column.is_empty() {
                return Err(invalid("empty column name".to_string()).into());
            }
            if !column
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(invalid(format!("column '{column}' has invalid characters")).into());
            }
            if columns.iter().any(|c| c == column) {
                return Err(invalid(format!("column '{column}' listed twice")).into());
            }
            columns.push(column.to_string());
        }

        Ok(Self { columns })
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Keeps only the projected columns of a row.
    ///
    /// Columns missing from the row are omitted rather than set to null.
    #[must_use]
    pub fn apply(&self, row: &Map<String, Value>) -> Map<String, Value> {
        self.columns
            .iter()
            .filter_map(|column| row.get(column).map(|v| (column.clone(), v.clone())))
            .collect()
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.columns.join(","))
    }
}

/// Sort order for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    /// Newest rows first, by creation time.
    #[must_use]
    pub const fn newest_first() -> Self {
        Self {
            column: CREATED_AT,
            descending: true,
        }
    }

    /// Returns the order in PostgREST query syntax, e.g. `created_at.desc`.
    #[must_use]
    pub fn to_query(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{direction}", self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_and_trims_columns() {
        let projection = Projection::parse(" id, name ,email").expect("valid");
        assert_eq!(projection.columns(), &["id", "name", "email"]);
        assert_eq!(projection.to_string(), "id,name,email");
    }

    #[test]
    fn rejects_malformed_projections() {
        for bad in ["", "id,,name", "*", "id,name;drop", "id,id", "name.first"] {
            assert!(Projection::parse(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn apply_keeps_projected_columns_only() {
        let projection = Projection::parse("id,name").expect("valid");
        let row = json!({"id": 1, "name": "Ann", "email": "ann@x.y"});
        let projected = projection.apply(row.as_object().expect("object"));
        assert_eq!(Value::Object(projected), json!({"id": 1, "name": "Ann"}));
    }

    #[test]
    fn apply_omits_missing_columns() {
        let projection = Projection::parse("id,phone").expect("valid");
        let row = json!({"id": 1});
        let projected = projection.apply(row.as_object().expect("object"));
        assert!(!projected.contains_key("phone"));
    }

    #[test]
    fn newest_first_query_syntax() {
        assert_eq!(Order::newest_first().to_query(), "created_at.desc");
    }
}
