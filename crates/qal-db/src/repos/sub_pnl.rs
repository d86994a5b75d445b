//! Sub-PnL repository: entity CRUD plus the tracked Sub-PnL metrics record.

use chrono::Utc;

use qal_core::Snapshot;
use qal_core::entities::{ActorRef, NewHistoryEntry, SubPnl, SubPnlMetrics};
use qal_core::enums::MetricsEntityType;
use qal_core::responses::SubPnlWithMetrics;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::MetricsService;
use crate::updates::sub_pnl_metrics::SubPnlMetricsUpdate;

fn row_to_sub_pnl(row: &libsql::Row) -> Result<SubPnl, DatabaseError> {
    Ok(SubPnl {
        id: row.get::<i64>(0)?,
        pnl_id: row.get::<i64>(1)?,
        name: row.get::<String>(2)?,
        description: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_sub_pnl_metrics(row: &libsql::Row) -> Result<SubPnlMetrics, DatabaseError> {
    Ok(SubPnlMetrics {
        id: row.get::<i64>(0)?,
        sub_pnl_id: row.get::<i64>(1)?,
        features_shipped: row.get::<i64>(2)?,
        total_testcases_executed: row.get::<i64>(3)?,
        total_bugs_logged: row.get::<i64>(4)?,
        regression_bugs_found: row.get::<i64>(5)?,
        sanity_time_avg_hours: row.get::<f64>(6)?,
        automation_coverage_percent: row.get::<f64>(7)?,
        escaped_bugs: row.get::<i64>(8)?,
        test_coverage_percent: row.get::<f64>(9)?,
        testcases_per_bug: row.get::<f64>(10)?,
        bugs_per_100_tests: row.get::<f64>(11)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

impl MetricsService {
    /// Create a Sub-PnL under an existing PnL.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the parent PnL does not exist.
    pub async fn create_sub_pnl(
        &self,
        pnl_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<SubPnl, DatabaseError> {
        self.get_pnl(pnl_id).await?;

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO sub_pnls (pnl_id, name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![pnl_id, name, description, now.to_rfc3339(), now.to_rfc3339()],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();

        Ok(SubPnl {
            id,
            pnl_id,
            name: name.to_string(),
            description: description.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a Sub-PnL by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL does not exist.
    pub async fn get_sub_pnl(&self, id: i64) -> Result<SubPnl, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, pnl_id, name, description, created_at, updated_at
                 FROM sub_pnls WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_sub_pnl(&row)
    }

    /// List a PnL's Sub-PnLs in creation order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the PnL does not exist.
    pub async fn list_sub_pnls(&self, pnl_id: i64) -> Result<Vec<SubPnl>, DatabaseError> {
        self.get_pnl(pnl_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, pnl_id, name, description, created_at, updated_at
                 FROM sub_pnls WHERE pnl_id = ?1 ORDER BY id",
                [pnl_id],
            )
            .await?;
        let mut sub_pnls = Vec::new();
        while let Some(row) = rows.next().await? {
            sub_pnls.push(row_to_sub_pnl(&row)?);
        }
        Ok(sub_pnls)
    }

    /// List a PnL's Sub-PnLs with their metrics records.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the PnL does not exist.
    pub async fn list_sub_pnls_with_metrics(
        &self,
        pnl_id: i64,
    ) -> Result<Vec<SubPnlWithMetrics>, DatabaseError> {
        let sub_pnls = self.list_sub_pnls(pnl_id).await?;
        let mut out = Vec::with_capacity(sub_pnls.len());
        for sub_pnl in sub_pnls {
            let metrics = match self.get_sub_pnl_metrics(sub_pnl.id).await {
                Ok(m) => Some(m),
                Err(DatabaseError::NoResult) => None,
                Err(e) => return Err(e),
            };
            out.push(SubPnlWithMetrics { sub_pnl, metrics });
        }
        Ok(out)
    }

    /// Fetch the metrics record for a Sub-PnL.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no record has been written yet.
    pub async fn get_sub_pnl_metrics(
        &self,
        sub_pnl_id: i64,
    ) -> Result<SubPnlMetrics, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, sub_pnl_id, features_shipped, total_testcases_executed,
                        total_bugs_logged, regression_bugs_found, sanity_time_avg_hours,
                        automation_coverage_percent, escaped_bugs, test_coverage_percent,
                        testcases_per_bug, bugs_per_100_tests, updated_at
                 FROM sub_pnl_metrics WHERE sub_pnl_id = ?1",
                [sub_pnl_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_sub_pnl_metrics(&row)
    }

    /// Write the metrics record for a Sub-PnL, creating it on first write.
    ///
    /// Records one history entry per call, linked to both the Sub-PnL and
    /// its parent PnL so scoped listings can find it either way.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL does not exist.
    pub async fn upsert_sub_pnl_metrics(
        &self,
        sub_pnl_id: i64,
        update: SubPnlMetricsUpdate,
        actor: Option<ActorRef>,
    ) -> Result<SubPnlMetrics, DatabaseError> {
        let sub_pnl = self.get_sub_pnl(sub_pnl_id).await?;

        match self.get_sub_pnl_metrics(sub_pnl_id).await {
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
                if let Some(v) = update.regression_bugs_found {
                    params.push(v.into());
                    sets.push(format!("regression_bugs_found = ?{}", params.len()));
                }
                if let Some(v) = update.sanity_time_avg_hours {
                    params.push(v.into());
                    sets.push(format!("sanity_time_avg_hours = ?{}", params.len()));
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
                params.push(sub_pnl_id.into());
                let sql = format!(
                    "UPDATE sub_pnl_metrics SET {} WHERE sub_pnl_id = ?{}",
                    sets.join(", "),
                    params.len()
                );
                self.db()
                    .conn()
                    .execute(&sql, libsql::params_from_iter(params))
                    .await?;

                let updated = self.get_sub_pnl_metrics(sub_pnl_id).await?;
                let current =
                    Snapshot::capture(&updated).map_err(|e| DatabaseError::Other(e.into()))?;
                self.record_history(
                    NewHistoryEntry::updated(
                        MetricsEntityType::SubPnlMetrics,
                        sub_pnl_id,
                        &previous,
                        &current,
                    )
                    .with_sub_pnl(sub_pnl.pnl_id, sub_pnl_id)
                    .described("Sub-PnL metrics updated")
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
                        "INSERT INTO sub_pnl_metrics (
                             sub_pnl_id, features_shipped, total_testcases_executed,
                             total_bugs_logged, regression_bugs_found, sanity_time_avg_hours,
                             automation_coverage_percent, escaped_bugs, test_coverage_percent,
                             testcases_per_bug, bugs_per_100_tests, updated_at
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                        libsql::params![
                            sub_pnl_id,
                            update.features_shipped.unwrap_or(0),
                            update.total_testcases_executed.unwrap_or(0),
                            update.total_bugs_logged.unwrap_or(0),
                            update.regression_bugs_found.unwrap_or(0),
                            update.sanity_time_avg_hours.unwrap_or(0.0),
                            update.automation_coverage_percent.unwrap_or(0.0),
                            update.escaped_bugs.unwrap_or(0),
                            update.test_coverage_percent.unwrap_or(0.0),
                            update.testcases_per_bug.unwrap_or(0.0),
                            update.bugs_per_100_tests.unwrap_or(0.0),
                            now.to_rfc3339()
                        ],
                    )
                    .await?;

                let created = self.get_sub_pnl_metrics(sub_pnl_id).await?;
                let current =
                    Snapshot::capture(&created).map_err(|e| DatabaseError::Other(e.into()))?;
                self.record_history(
                    NewHistoryEntry::created(
                        MetricsEntityType::SubPnlMetrics,
                        sub_pnl_id,
                        &current,
                    )
                    .with_sub_pnl(sub_pnl.pnl_id, sub_pnl_id)
                    .described("Sub-PnL metrics created")
                    .by(actor),
                )
                .await;
                Ok(created)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the metrics record for a Sub-PnL and record a `delete` entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL or its record does
    /// not exist.
    pub async fn delete_sub_pnl_metrics(
        &self,
        sub_pnl_id: i64,
        actor: Option<ActorRef>,
    ) -> Result<(), DatabaseError> {
        let sub_pnl = self.get_sub_pnl(sub_pnl_id).await?;
        let existing = self.get_sub_pnl_metrics(sub_pnl_id).await?;
        let last = Snapshot::capture(&existing).map_err(|e| DatabaseError::Other(e.into()))?;

        self.db()
            .conn()
            .execute(
                "DELETE FROM sub_pnl_metrics WHERE sub_pnl_id = ?1",
                [sub_pnl_id],
            )
            .await?;

        self.record_history(
            NewHistoryEntry::deleted(MetricsEntityType::SubPnlMetrics, sub_pnl_id, &last)
                .with_sub_pnl(sub_pnl.pnl_id, sub_pnl_id)
                .described("Sub-PnL metrics deleted")
                .by(actor),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{create_test_pnl, test_service};
    use crate::updates::sub_pnl_metrics::SubPnlMetricsUpdateBuilder;

    #[tokio::test]
    async fn create_sub_pnl_under_missing_pnl_is_no_result() {
        let svc = test_service().await;
        let result = svc.create_sub_pnl(9, "Logistics", None).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn create_and_list_sub_pnls() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "ePharmacy").await;

        svc.create_sub_pnl(pnl_id, "Logistics", None).await.unwrap();
        svc.create_sub_pnl(pnl_id, "Warehouse", Some("Fulfillment QA"))
            .await
            .unwrap();

        let sub_pnls = svc.list_sub_pnls(pnl_id).await.unwrap();
        assert_eq!(sub_pnls.len(), 2);
        assert_eq!(sub_pnls[0].name, "Logistics");
        assert_eq!(sub_pnls[1].description.as_deref(), Some("Fulfillment QA"));
    }

    #[tokio::test]
    async fn upsert_links_entry_to_parent_pnl() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "ePharmacy").await;
        let sub = svc.create_sub_pnl(pnl_id, "Logistics", None).await.unwrap();

        let update = SubPnlMetricsUpdateBuilder::new().escaped_bugs(2).build();
        svc.upsert_sub_pnl_metrics(sub.id, update, None).await.unwrap();

        let entries = svc.list_history_by_pnl(pnl_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pnl_id, Some(pnl_id));
        assert_eq!(entries[0].sub_pnl_id, Some(sub.id));
        assert_eq!(entries[0].entity_id, sub.id);
    }

    #[tokio::test]
    async fn sub_pnl_metrics_roundtrip() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "Telemedicine").await;
        let sub = svc
            .create_sub_pnl(pnl_id, "Video Platform", None)
            .await
            .unwrap();

        let update = SubPnlMetricsUpdateBuilder::new()
            .total_testcases_executed(180)
            .automation_coverage_percent(70.0)
            .build();
        svc.upsert_sub_pnl_metrics(sub.id, update, None).await.unwrap();

        let metrics = svc.get_sub_pnl_metrics(sub.id).await.unwrap();
        assert_eq!(metrics.total_testcases_executed, 180);
        assert!((metrics.automation_coverage_percent - 70.0).abs() < f64::EPSILON);

        let views = svc.list_sub_pnls_with_metrics(pnl_id).await.unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].metrics.is_some());
    }

    #[tokio::test]
    async fn delete_sub_pnl_metrics_records_delete_entry() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "ePharmacy").await;
        let sub = svc.create_sub_pnl(pnl_id, "Audit App", None).await.unwrap();

        let update = SubPnlMetricsUpdateBuilder::new().total_bugs_logged(9).build();
        svc.upsert_sub_pnl_metrics(sub.id, update, None).await.unwrap();
        svc.delete_sub_pnl_metrics(sub.id, None).await.unwrap();

        let entries = svc.list_history_by_sub_pnl(sub.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].change_type, qal_core::enums::ChangeType::Delete);
        assert!(entries[0].previous_values.is_some());
    }
}
