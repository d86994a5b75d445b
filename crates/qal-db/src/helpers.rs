//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed
//! entity structs. These helpers isolate the parsing logic and handle the
//! dual datetime format issue (`SQLite`'s `datetime('now')` vs Rust's
//! `to_rfc3339()`).

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s
/// default format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either
/// format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all qal-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum
/// variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty
/// string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qal_core::enums::{ChangeType, MetricsEntityType};
    use rstest::rstest;

    #[rstest]
    #[case("2026-02-09T14:30:00+00:00")]
    #[case("2026-02-09T14:30:00Z")]
    #[case("2026-02-09 14:30:00")]
    fn parse_datetime_accepts_both_formats(#[case] input: &str) {
        let dt = parse_datetime(input).unwrap();
        assert_eq!(dt.timezone(), Utc);
    }

    #[test]
    fn parse_datetime_rejects_garbage() {
        let result = parse_datetime("not a date");
        assert!(matches!(result, Err(DatabaseError::Query(_))));
    }

    #[rstest]
    #[case("create", ChangeType::Create)]
    #[case("update", ChangeType::Update)]
    #[case("delete", ChangeType::Delete)]
    fn parse_enum_change_type(#[case] input: &str, #[case] expected: ChangeType) {
        let parsed: ChangeType = parse_enum(input).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_enum_entity_type() {
        let parsed: MetricsEntityType = parse_enum("sub_pnl_detail_metrics").unwrap();
        assert_eq!(parsed, MetricsEntityType::SubPnlDetailMetrics);
    }

    #[test]
    fn parse_enum_rejects_unknown() {
        let result: Result<ChangeType, _> = parse_enum("rename");
        assert!(matches!(result, Err(DatabaseError::Query(_))));
    }
}
