//! # qal-db
//!
//! libSQL database operations for QAlytics.
//!
//! Handles all relational state: PnLs, Sub-PnLs, their metrics records, and
//! the append-only metrics history. Uses the `libsql` crate (C `SQLite`
//! fork, v0.9.29) with a local database file, or `:memory:` for tests.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
pub(crate) mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all QAlytics state operations.
///
/// Wraps a libSQL database and connection. Repo methods live on
/// [`service::MetricsService`] and reach the connection through here.
pub struct QalDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl QalDb {
    /// Open a local-only database at the given path.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let qal_db = Self { db, conn };
        qal_db.run_migrations().await?;
        Ok(qal_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
