//! PnL repository: entity CRUD plus the tracked PnL metrics record.

use chrono::Utc;

use qal_core::Snapshot;
use qal_core::entities::{ActorRef, NewHistoryEntry, Pnl, PnlMetrics};
use qal_core::enums::MetricsEntityType;
use qal_core::responses::PnlWithMetrics;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::MetricsService;
use crate::updates::pnl_metrics::PnlMetricsUpdate;

fn row_to_pnl(row: &libsql::Row) -> Result<Pnl, DatabaseError> {
    Ok(Pnl {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        description: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_pnl_metrics(row: &libsql::Row) -> Result<PnlMetrics, DatabaseError> {
    Ok(PnlMetrics {
        id: row.get::<i64>(0)?,
        pnl_id: row.get::<i64>(1)?,
        features_shipped: row.get::<i64>(2)?,
        total_testcases_executed: row.get::<i64>(3)?,
        total_bugs_logged: row.get::<i64>(4)?,
        testcase_peer_review: row.get::<i64>(5)?,
        regression_bugs_found: row.get::<i64>(6)?,
        sanity_time_avg_hours: row.get::<f64>(7)?,
        api_test_time_avg_hours: row.get::<f64>(8)?,
        automation_coverage_percent: row.get::<f64>(9)?,
        escaped_bugs: row.get::<i64>(10)?,
        test_coverage_percent: row.get::<f64>(11)?,
        testcases_per_bug: row.get::<f64>(12)?,
        bugs_per_100_tests: row.get::<f64>(13)?,
        updated_at: parse_datetime(&row.get::<String>(14)?)?,
    })
}

impl MetricsService {
    /// Create a PnL.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_pnl(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Pnl, DatabaseError> {
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO pnls (name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![name, description, now.to_rfc3339(), now.to_rfc3339()],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();

        Ok(Pnl {
            id,
            name: name.to_string(),
            description: description.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a PnL by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the PnL does not exist.
    pub async fn get_pnl(&self, id: i64) -> Result<Pnl, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, description, created_at, updated_at
                 FROM pnls WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_pnl(&row)
    }

    /// List all PnLs in creation order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_pnls(&self) -> Result<Vec<Pnl>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, description, created_at, updated_at
                 FROM pnls ORDER BY id",
                (),
            )
            .await?;
        let mut pnls = Vec::new();
        while let Some(row) = rows.next().await? {
            pnls.push(row_to_pnl(&row)?);
        }
        Ok(pnls)
    }

    /// List all PnLs with their metrics records (dashboard view). A PnL
    /// whose metrics record has not been written yet carries `None`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_pnls_with_metrics(&self) -> Result<Vec<PnlWithMetrics>, DatabaseError> {
        let pnls = self.list_pnls().await?;
        let mut out = Vec::with_capacity(pnls.len());
        for pnl in pnls {
            let metrics = match self.get_pnl_metrics(pnl.id).await {
                Ok(m) => Some(m),
                Err(DatabaseError::NoResult) => None,
                Err(e) => return Err(e),
            };
            out.push(PnlWithMetrics { pnl, metrics });
        }
        Ok(out)
    }

    /// Fetch the metrics record for a PnL.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no record has been written yet.
    pub async fn get_pnl_metrics(&self, pnl_id: i64) -> Result<PnlMetrics, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, pnl_id, features_shipped, total_testcases_executed,
                        total_bugs_logged, testcase_peer_review, regression_bugs_found,
                        sanity_time_avg_hours, api_test_time_avg_hours,
                        automation_coverage_percent, escaped_bugs, test_coverage_percent,
                        testcases_per_bug, bugs_per_100_tests, updated_at
                 FROM pnl_metrics WHERE pnl_id = ?1",
                [pnl_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_pnl_metrics(&row)
    }

    /// Write the metrics record for a PnL, creating it on first write.
    ///
    /// Records one history entry per call: `create` when the record did not
    /// exist, `update` otherwise. An update with no fields set is a no-op
    /// and records nothing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the PnL does not exist, or
    /// `DatabaseError` if a write fails.
    pub async fn upsert_pnl_metrics(
        &self,
        pnl_id: i64,
        update: PnlMetricsUpdate,
        actor: Option<ActorRef>,
    ) -> Result<PnlMetrics, DatabaseError> {
        self.get_pnl(pnl_id).await?;

        match self.get_pnl_metrics(pnl_id).await {
            Ok(existing) => {
                let previous =
                    Snapshot::capture(&existing).map_err(|e| DatabaseError::Other(e.into()))?;

                let mut sets = Vec::new();
                let mut params: Vec<libsql::Value> = Vec::new();

                if let Some(v) = update.features_shipped {
                    params.push(v.into());
                    sets.push(format!("features_shipped = ?{}", params.len()));
                }
                if let Some(v) = update.total_testcases_executed {
                    params.push(v.into());
                    sets.push(format!("total_testcases_executed = ?{}", params.len()));
                }
                if let Some(v) = update.total_bugs_logged {
                    params.push(v.into());
                    sets.push(format!("total_bugs_logged = ?{}", params.len()));
                }
                if let Some(v) = update.testcase_peer_review {
                    params.push(v.into());
                    sets.push(format!("testcase_peer_review = ?{}", params.len()));
                }
                if let Some(v) = update.regression_bugs_found {
                    params.push(v.into());
                    sets.push(format!("regression_bugs_found = ?{}", params.len()));
                }
                if let Some(v) = update.sanity_time_avg_hours {
                    params.push(v.into());
                    sets.push(format!("sanity_time_avg_hours = ?{}", params.len()));
                }
                if let Some(v) = update.api_test_time_avg_hours {
                    params.push(v.into());
                    sets.push(format!("api_test_time_avg_hours = ?{}", params.len()));
                }
                if let Some(v) = update.automation_coverage_percent {
                    params.push(v.into());
                    sets.push(format!("automation_coverage_percent = ?{}", params.len()));
                }
                if let Some(v) = update.escaped_bugs {
                    params.push(v.into());
                    sets.push(format!("escaped_bugs = ?{}", params.len()));
                }
                if let Some(v) = update.test_coverage_percent {
                    params.push(v.into());
                    sets.push(format!("test_coverage_percent = ?{}", params.len()));
                }
                if let Some(v) = update.testcases_per_bug {
                    params.push(v.into());
                    sets.push(format!("testcases_per_bug = ?{}", params.len()));
                }
                if let Some(v) = update.bugs_per_100_tests {
                    params.push(v.into());
                    sets.push(format!("bugs_per_100_tests = ?{}", params.len()));
                }

                if sets.is_empty() {
                    return Ok(existing);
                }

                params.push(Utc::now().to_rfc3339().into());
                sets.push(format!("updated_at = ?{}", params.len()));
                params.push(pnl_id.into());
                let sql = format!(
                    "UPDATE pnl_metrics SET {} WHERE pnl_id = ?{}",
                    sets.join(", "),
                    params.len()
                );
                self.db()
                    .conn()
                    .execute(&sql, libsql::params_from_iter(params))
                    .await?;

                let updated = self.get_pnl_metrics(pnl_id).await?;
                let current =
                    Snapshot::capture(&updated).map_err(|e| DatabaseError::Other(e.into()))?;
                self.record_history(
                    NewHistoryEntry::updated(
                        MetricsEntityType::PnlMetrics,
                        pnl_id,
                        &previous,
                        &current,
                    )
                    .with_pnl(pnl_id)
                    .described("PnL metrics updated")
                    .by(actor),
                )
                .await;
                Ok(updated)
            }
            Err(DatabaseError::NoResult) => {
                let now = Utc::now();
                self.db()
                    .conn()
                    .execute(
                        "INSERT INTO pnl_metrics (
                             pnl_id, features_shipped, total_testcases_executed,
                             total_bugs_logged, testcase_peer_review, regression_bugs_found,
                             sanity_time_avg_hours, api_test_time_avg_hours,
                             automation_coverage_percent, escaped_bugs,
                             test_coverage_percent, testcases_per_bug, bugs_per_100_tests,
                             updated_at
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                        libsql::params![
                            pnl_id,
                            update.features_shipped.unwrap_or(0),
                            update.total_testcases_executed.unwrap_or(0),
                            update.total_bugs_logged.unwrap_or(0),
                            update.testcase_peer_review.unwrap_or(0),
                            update.regression_bugs_found.unwrap_or(0),
                            update.sanity_time_avg_hours.unwrap_or(0.0),
                            update.api_test_time_avg_hours.unwrap_or(0.0),
                            update.automation_coverage_percent.unwrap_or(0.0),
                            update.escaped_bugs.unwrap_or(0),
                            update.test_coverage_percent.unwrap_or(0.0),
                            update.testcases_per_bug.unwrap_or(0.0),
                            update.bugs_per_100_tests.unwrap_or(0.0),
                            now.to_rfc3339()
                        ],
                    )
                    .await?;

                let created = self.get_pnl_metrics(pnl_id).await?;
                let current =
                    Snapshot::capture(&created).map_err(|e| DatabaseError::Other(e.into()))?;
                self.record_history(
                    NewHistoryEntry::created(MetricsEntityType::PnlMetrics, pnl_id, &current)
                        .with_pnl(pnl_id)
                        .described("PnL metrics created")
                        .by(actor),
                )
                .await;
                Ok(created)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the metrics record for a PnL and record a `delete` entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no record exists.
    pub async fn delete_pnl_metrics(
        &self,
        pnl_id: i64,
        actor: Option<ActorRef>,
    ) -> Result<(), DatabaseError> {
        let existing = self.get_pnl_metrics(pnl_id).await?;
        let last = Snapshot::capture(&existing).map_err(|e| DatabaseError::Other(e.into()))?;

        self.db()
            .conn()
            .execute("DELETE FROM pnl_metrics WHERE pnl_id = ?1", [pnl_id])
            .await?;

        self.record_history(
            NewHistoryEntry::deleted(MetricsEntityType::PnlMetrics, pnl_id, &last)
                .with_pnl(pnl_id)
                .described("PnL metrics deleted")
                .by(actor),
        )
        .await;
        Ok(())
    }
}
