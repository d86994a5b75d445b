//! Snapshot encoding for history entries.
//!
//! Tracked records are written into history rows as string-encoded JSON
//! objects. The store and the wire treat those strings as opaque blobs;
//! decoding happens only where a display needs field access, and a blob
//! that fails to decode is reported for that entry alone.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Fields never captured into a snapshot. Snapshots describe the measured
/// values, not row identity or bookkeeping timestamps.
const EXCLUDED_FIELDS: &[&str] = &["id", "pnl_id", "sub_pnl_id", "created_at", "updated_at"];

/// Snapshot encode/decode failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The record could not be serialized into a JSON object.
    #[error("Snapshot encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored string is not valid JSON.
    #[error("Snapshot is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The JSON parsed but is not an object.
    #[error("Snapshot is not a JSON object")]
    NotAnObject,
}

/// A decoded snapshot of a tracked record's measured fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    /// Capture a record's serializable fields, dropping ids and timestamps.
    ///
    /// # Errors
    /// Returns an error if the record does not serialize to a JSON object.
    pub fn capture<T: Serialize>(record: &T) -> Result<Self, SnapshotError> {
        let value = serde_json::to_value(record).map_err(SnapshotError::Encode)?;
        let Value::Object(mut map) = value else {
            return Err(SnapshotError::NotAnObject);
        };
        for field in EXCLUDED_FIELDS {
            map.remove(*field);
        }
        Ok(Self(map))
    }

    /// Decode a stored snapshot string.
    ///
    /// # Errors
    /// Returns an error if the string is not a JSON object. Callers listing
    /// many entries decode per entry and keep going on failure.
    pub fn parse(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw).map_err(SnapshotError::Decode)?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(SnapshotError::NotAnObject),
        }
    }

    /// Encode to the string form stored on history rows.
    #[must_use]
    pub fn encode(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Look up a captured field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Consume into a plain JSON value for rendering.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
