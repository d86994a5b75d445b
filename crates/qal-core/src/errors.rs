//! Cross-cutting error types for QAlytics.
//!
//! This module defines errors that can originate from any crate in the
//! system. Domain-specific errors (e.g., `DatabaseError`, `ConfigError`) are
//! defined in their respective crates; the HTTP surface converts everything
//! into its own response envelope in `qal-server`.

use thiserror::Error;

/// Errors that can be raised by any QAlytics crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: i64 },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored snapshot could not be encoded or decoded.
    #[error(transparent)]
    Snapshot(#[from] crate::snapshot::SnapshotError),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
