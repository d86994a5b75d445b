//! Service layer orchestrating entity mutations with history recording.
//!
//! `MetricsService` wraps `QalDb` (raw database access). All repo methods
//! are implemented as `impl MetricsService` blocks in `repos/`. Tracked
//! mutations follow the recorder protocol:
//!
//! 1. Check the scope row exists (missing scope is `NoResult`)
//! 2. Execute the primary SQL write
//! 3. Append the history entry; an append failure is logged as a warning
//!    and never rolls back the primary write

use crate::QalDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with metrics history recording.
pub struct MetricsService {
    db: QalDb,
}

impl MetricsService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for
    ///   tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = QalDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `QalDb` (for testing).
    #[must_use]
    pub const fn from_db(db: QalDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &QalDb {
        &self.db
    }
}
