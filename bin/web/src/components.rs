//! Small view helpers shared by the pages.

use crate::hooks::TableHandle;
use chrono::{DateTime, NaiveDateTime, Utc};
use leptos::prelude::*;
use medicare_backend::{QueryState, Record};
use medicare_core::RecordId;

/// Inline panel for a failed read or write.
#[component]
pub fn ErrorPanel(message: String) -> impl IntoView {
    view! {
        <div class="error-panel" role="alert">
            <strong>"Something went wrong. "</strong>
            <span>{message}</span>
        </div>
    }
}

/// Renders a table read: loading text, error panel, empty notice, or rows.
pub fn query_view<T, F>(handle: TableHandle<T>, empty: &'static str, render: F) -> impl IntoView
where
    T: Record,
    F: Fn(Vec<T>) -> AnyView + Send + Sync + 'static,
{
    move || match handle.state() {
        QueryState::Loading => view! { <p class="loading">"Loading..."</p> }.into_any(),
        QueryState::Error(message) => view! { <ErrorPanel message=message/> }.into_any(),
        QueryState::Data(rows) if rows.is_empty() => {
            view! { <p class="empty">{empty}</p> }.into_any()
        }
        QueryState::Data(rows) => render(rows),
    }
}

/// Number of rows once loaded, `None` while loading or after an error.
pub fn row_count<T: Record>(handle: TableHandle<T>, keep: impl Fn(&T) -> bool) -> Option<usize> {
    handle
        .state()
        .data()
        .map(|rows| rows.iter().filter(|row| keep(row)).count())
}

/// Resolves an id to a display name from a loaded table, falling back to the id.
pub fn name_lookup<T: Record>(
    handle: TableHandle<T>,
    id: &RecordId,
    name: impl Fn(&T) -> &str,
) -> String {
    handle
        .state()
        .data()
        .and_then(|rows| rows.iter().find(|row| row.id() == id).map(|row| name(row).to_string()))
        .unwrap_or_else(|| id.to_string())
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Parses the value of a `datetime-local` input, read as UTC.
pub fn parse_datetime_local(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Treats blank form input as absent.
pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_input_is_none() {
        assert_eq!(non_empty("   ".to_string()), None);
        assert_eq!(non_empty(" 555-0100 ".to_string()), Some("555-0100".to_string()));
    }

    #[test]
    fn parses_datetime_local_values() {
        let parsed = parse_datetime_local("2026-10-20T09:30").expect("valid");
        assert_eq!(format_timestamp(&parsed), "2026-10-20 09:30");
        assert!(parse_datetime_local("").is_none());
        assert!(parse_datetime_local("tomorrow").is_none());
    }

    #[test]
    fn timestamps_are_minute_precision() {
        let at = Utc
            .with_ymd_and_hms(2026, 10, 18, 9, 5, 59)
            .single()
            .expect("valid");
        assert_eq!(format_timestamp(&at), "2026-10-18 09:05");
    }
}
