//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent
//! re-running.

use crate::QalDb;
use crate::error::DatabaseError;

/// Initial schema: entity tables and the three metrics tables.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Metrics history table and its query indexes.
const MIGRATION_002: &str = include_str!("../migrations/002_metrics_history.sql");

impl QalDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_metrics_history: {e}")))?;
        Ok(())
    }
}
