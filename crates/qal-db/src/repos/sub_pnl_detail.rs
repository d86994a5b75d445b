//! Sub-PnL detail metrics repository. Same shape as the Sub-PnL metrics
//! record but with the full measurement set plus versioning flags, and its
//! own entity type tag in the history trail.

use chrono::Utc;

use qal_core::Snapshot;
use qal_core::entities::{ActorRef, NewHistoryEntry, SubPnlDetailMetrics};
use qal_core::enums::MetricsEntityType;
use qal_core::responses::SubPnlWithDetail;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::MetricsService;
use crate::updates::sub_pnl_detail::SubPnlDetailUpdate;

const DETAIL_COLUMNS: &str = "id, sub_pnl_id, features_shipped, total_testcases_executed,
    total_bugs_logged, testcase_peer_review, regression_bugs_found, sanity_time_avg_hours,
    api_test_time_avg_hours, automation_coverage_percent, escaped_bugs, test_coverage_percent,
    testcases_per_bug, bugs_per_100_tests, version, description, is_active, created_at,
    updated_at";

fn row_to_detail_metrics(row: &libsql::Row) -> Result<SubPnlDetailMetrics, DatabaseError> {
    Ok(SubPnlDetailMetrics {
        id: row.get::<i64>(0)?,
        sub_pnl_id: row.get::<i64>(1)?,
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
        version: row.get::<i64>(14)?,
        description: get_opt_string(row, 15)?,
        is_active: row.get::<i64>(16)? != 0,
        created_at: parse_datetime(&row.get::<String>(17)?)?,
        updated_at: parse_datetime(&row.get::<String>(18)?)?,
    })
}

impl MetricsService {
    /// Fetch a Sub-PnL together with its detail-metrics record, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL does not exist.
    pub async fn get_sub_pnl_with_detail(
        &self,
        sub_pnl_id: i64,
    ) -> Result<SubPnlWithDetail, DatabaseError> {
        let sub_pnl = self.get_sub_pnl(sub_pnl_id).await?;
        let detail_metrics = match self.get_sub_pnl_detail_metrics(sub_pnl_id).await {
            Ok(m) => Some(m),
            Err(DatabaseError::NoResult) => None,
            Err(e) => return Err(e),
        };
        Ok(SubPnlWithDetail {
            sub_pnl,
            detail_metrics,
        })
    }

    /// Fetch the detail-metrics record for a Sub-PnL.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no record has been written yet.
    pub async fn get_sub_pnl_detail_metrics(
        &self,
        sub_pnl_id: i64,
    ) -> Result<SubPnlDetailMetrics, DatabaseError> {
        let sql =
            format!("SELECT {DETAIL_COLUMNS} FROM sub_pnl_detail_metrics WHERE sub_pnl_id = ?1");
        let mut rows = self.db().conn().query(&sql, [sub_pnl_id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_detail_metrics(&row)
    }

    /// Write the detail-metrics record for a Sub-PnL, creating it on first
    /// write. `version` and `is_active` only change when the update sets them.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL does not exist.
    pub async fn upsert_sub_pnl_detail_metrics(
        &self,
        sub_pnl_id: i64,
        update: SubPnlDetailUpdate,
        actor: Option<ActorRef>,
    ) -> Result<SubPnlDetailMetrics, DatabaseError> {
        let sub_pnl = self.get_sub_pnl(sub_pnl_id).await?;

        match self.get_sub_pnl_detail_metrics(sub_pnl_id).await {
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
                if let Some(v) = update.version {
                    params.push(v.into());
                    sets.push(format!("version = ?{}", params.len()));
                }
                if let Some(v) = update.description {
                    params.push(v.into());
                    sets.push(format!("description = ?{}", params.len()));
                }
                if let Some(v) = update.is_active {
                    params.push(i64::from(v).into());
                    sets.push(format!("is_active = ?{}", params.len()));
                }

                if sets.is_empty() {
                    return Ok(existing);
                }

                params.push(Utc::now().to_rfc3339().into());
                sets.push(format!("updated_at = ?{}", params.len()));
                params.push(sub_pnl_id.into());
                let sql = format!(
                    "UPDATE sub_pnl_detail_metrics SET {} WHERE sub_pnl_id = ?{}",
                    sets.join(", "),
                    params.len()
                );
                self.db()
                    .conn()
                    .execute(&sql, libsql::params_from_iter(params))
                    .await?;

                let updated = self.get_sub_pnl_detail_metrics(sub_pnl_id).await?;
                let current =
                    Snapshot::capture(&updated).map_err(|e| DatabaseError::Other(e.into()))?;
                self.record_history(
                    NewHistoryEntry::updated(
                        MetricsEntityType::SubPnlDetailMetrics,
                        sub_pnl_id,
                        &previous,
                        &current,
                    )
                    .with_sub_pnl(sub_pnl.pnl_id, sub_pnl_id)
                    .described("Sub-PnL detail metrics updated")
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
                        "INSERT INTO sub_pnl_detail_metrics (
                             sub_pnl_id, features_shipped, total_testcases_executed,
                             total_bugs_logged, testcase_peer_review, regression_bugs_found,
                             sanity_time_avg_hours, api_test_time_avg_hours,
                             automation_coverage_percent, escaped_bugs, test_coverage_percent,
                             testcases_per_bug, bugs_per_100_tests, version, description,
                             is_active, created_at, updated_at
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                                   ?14, ?15, ?16, ?17, ?18)",
                        libsql::params![
                            sub_pnl_id,
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
                            update.version.unwrap_or(1),
                            update.description.as_deref(),
                            i64::from(update.is_active.unwrap_or(true)),
                            now.to_rfc3339(),
                            now.to_rfc3339()
                        ],
                    )
                    .await?;

                let created = self.get_sub_pnl_detail_metrics(sub_pnl_id).await?;
                let current =
                    Snapshot::capture(&created).map_err(|e| DatabaseError::Other(e.into()))?;
                self.record_history(
                    NewHistoryEntry::created(
                        MetricsEntityType::SubPnlDetailMetrics,
                        sub_pnl_id,
                        &current,
                    )
                    .with_sub_pnl(sub_pnl.pnl_id, sub_pnl_id)
                    .described("Sub-PnL detail metrics created")
                    .by(actor),
                )
                .await;
                Ok(created)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the detail-metrics record for a Sub-PnL and record a `delete`
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL or its record does
    /// not exist.
    pub async fn delete_sub_pnl_detail_metrics(
        &self,
        sub_pnl_id: i64,
        actor: Option<ActorRef>,
    ) -> Result<(), DatabaseError> {
        let sub_pnl = self.get_sub_pnl(sub_pnl_id).await?;
        let existing = self.get_sub_pnl_detail_metrics(sub_pnl_id).await?;
        let last = Snapshot::capture(&existing).map_err(|e| DatabaseError::Other(e.into()))?;

        self.db()
            .conn()
            .execute(
                "DELETE FROM sub_pnl_detail_metrics WHERE sub_pnl_id = ?1",
                [sub_pnl_id],
            )
            .await?;

        self.record_history(
            NewHistoryEntry::deleted(MetricsEntityType::SubPnlDetailMetrics, sub_pnl_id, &last)
                .with_sub_pnl(sub_pnl.pnl_id, sub_pnl_id)
                .described("Sub-PnL detail metrics deleted")
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
    use crate::updates::sub_pnl_detail::SubPnlDetailUpdateBuilder;

    #[tokio::test]
    async fn detail_missing_until_first_write() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "ePharmacy").await;
        let sub = svc.create_sub_pnl(pnl_id, "Logistics", None).await.unwrap();

        let result = svc.get_sub_pnl_detail_metrics(sub.id).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));

        let view = svc.get_sub_pnl_with_detail(sub.id).await.unwrap();
        assert!(view.detail_metrics.is_none());
    }

    #[tokio::test]
    async fn first_write_fills_version_and_active_defaults() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "eDiagnostics").await;
        let sub = svc.create_sub_pnl(pnl_id, "Lab Network", None).await.unwrap();

        let update = SubPnlDetailUpdateBuilder::new()
            .total_testcases_executed(240)
            .build();
        let detail = svc
            .upsert_sub_pnl_detail_metrics(sub.id, update, None)
            .await
            .unwrap();

        assert_eq!(detail.version, 1);
        assert!(detail.is_active);
        assert!(detail.description.is_none());
        assert_eq!(detail.total_testcases_executed, 240);
    }

    #[tokio::test]
    async fn update_changes_version_and_flags_when_set() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "eDiagnostics").await;
        let sub = svc.create_sub_pnl(pnl_id, "Lab Network", None).await.unwrap();

        let first = SubPnlDetailUpdateBuilder::new().escaped_bugs(1).build();
        svc.upsert_sub_pnl_detail_metrics(sub.id, first, None)
            .await
            .unwrap();

        let second = SubPnlDetailUpdateBuilder::new()
            .version(2)
            .description("Q3 revision")
            .is_active(false)
            .build();
        let detail = svc
            .upsert_sub_pnl_detail_metrics(sub.id, second, None)
            .await
            .unwrap();

        assert_eq!(detail.version, 2);
        assert_eq!(detail.description.as_deref(), Some("Q3 revision"));
        assert!(!detail.is_active);
        assert_eq!(detail.escaped_bugs, 1);
    }

    #[tokio::test]
    async fn detail_history_uses_its_own_entity_type() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "Telemedicine").await;
        let sub = svc
            .create_sub_pnl(pnl_id, "Video Platform", None)
            .await
            .unwrap();

        let update = SubPnlDetailUpdateBuilder::new().features_shipped(4).build();
        svc.upsert_sub_pnl_detail_metrics(sub.id, update, None)
            .await
            .unwrap();
        svc.delete_sub_pnl_detail_metrics(sub.id, None).await.unwrap();

        let entries = svc.list_history_by_sub_pnl(sub.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(
                entry.entity_type,
                MetricsEntityType::SubPnlDetailMetrics
            );
            assert_eq!(entry.pnl_id, Some(pnl_id));
        }
    }
}
