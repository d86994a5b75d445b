//! Metrics history repository.
//!
//! Append-only entries recording every tracked-record mutation. Supports
//! dynamic filtering, paging, and scoped listings by owning PnL or Sub-PnL.
//! Snapshot strings pass through unparsed; display edges decode them.

use chrono::Utc;

use qal_core::entities::{ActorRef, HistoryEntry, NewHistoryEntry};
use qal_core::enums::{ChangeType, MetricsEntityType};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::MetricsService;

/// Filter criteria for global history queries.
#[derive(Debug, Default)]
pub struct HistoryFilter {
    pub entity_type: Option<MetricsEntityType>,
    pub entity_id: Option<i64>,
    pub change_type: Option<ChangeType>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

const HISTORY_COLUMNS: &str = "id, entity_type, entity_id, pnl_id, sub_pnl_id, change_type,
    metrics_data, previous_values, change_description, changed_by_id, changed_by_email,
    created_at";

fn row_to_entry(row: &libsql::Row) -> Result<HistoryEntry, DatabaseError> {
    let user = match row.get::<Option<i64>>(9)? {
        Some(id) => Some(ActorRef {
            id,
            email: get_opt_string(row, 10)?,
        }),
        None => None,
    };
    Ok(HistoryEntry {
        id: row.get::<i64>(0)?,
        entity_type: parse_enum(&row.get::<String>(1)?)?,
        entity_id: row.get::<i64>(2)?,
        pnl_id: row.get::<Option<i64>>(3)?,
        sub_pnl_id: row.get::<Option<i64>>(4)?,
        change_type: parse_enum(&row.get::<String>(5)?)?,
        metrics_data: row.get::<String>(6)?,
        previous_values: get_opt_string(row, 7)?,
        change_description: get_opt_string(row, 8)?,
        user,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl MetricsService {
    /// Append a history entry and return it with its assigned id.
    ///
    /// Entry ids come from the store and only grow, so id order breaks ties
    /// between entries sharing a timestamp.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_history(
        &self,
        draft: NewHistoryEntry,
    ) -> Result<HistoryEntry, DatabaseError> {
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO metrics_history (
                     entity_type, entity_id, pnl_id, sub_pnl_id, change_type, metrics_data,
                     previous_values, change_description, changed_by_id, changed_by_email,
                     created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                libsql::params![
                    draft.entity_type.as_str(),
                    draft.entity_id,
                    draft.pnl_id,
                    draft.sub_pnl_id,
                    draft.change_type.as_str(),
                    draft.metrics_data.as_str(),
                    draft.previous_values.as_deref(),
                    draft.change_description.as_deref(),
                    draft.user.as_ref().map(|u| u.id),
                    draft.user.as_ref().and_then(|u| u.email.as_deref()),
                    now.to_rfc3339()
                ],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();
        Ok(HistoryEntry::from_draft(draft, id, now))
    }

    /// Append a history entry for a mutation that already committed.
    ///
    /// The primary write stands either way, so a failed append is logged
    /// rather than returned.
    pub(crate) async fn record_history(&self, draft: NewHistoryEntry) {
        let entity_type = draft.entity_type;
        let entity_id = draft.entity_id;
        if let Err(error) = self.append_history(draft).await {
            tracing::warn!(
                entity_type = entity_type.as_str(),
                entity_id,
                %error,
                "failed to record metrics history entry"
            );
        }
    }

    /// Query history entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_history(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<HistoryEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(eid) = filter.entity_id {
            params.push(libsql::Value::Integer(eid));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ct) = filter.change_type {
            params.push(libsql::Value::Text(ct.as_str().to_string()));
            conditions.push(format!("change_type = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(50);
        let offset = filter.offset.unwrap_or(0);
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM metrics_history {where_clause}
             ORDER BY created_at DESC, id DESC LIMIT {limit} OFFSET {offset}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// List every entry linked to a PnL, including entries for its
    /// Sub-PnLs, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the PnL does not exist.
    pub async fn list_history_by_pnl(
        &self,
        pnl_id: i64,
    ) -> Result<Vec<HistoryEntry>, DatabaseError> {
        self.get_pnl(pnl_id).await?;

        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM metrics_history
             WHERE pnl_id = ?1 ORDER BY created_at DESC, id DESC"
        );
        let mut rows = self.db().conn().query(&sql, [pnl_id]).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// List every entry linked to a Sub-PnL, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the Sub-PnL does not exist.
    pub async fn list_history_by_sub_pnl(
        &self,
        sub_pnl_id: i64,
    ) -> Result<Vec<HistoryEntry>, DatabaseError> {
        self.get_sub_pnl(sub_pnl_id).await?;

        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM metrics_history
             WHERE sub_pnl_id = ?1 ORDER BY created_at DESC, id DESC"
        );
        let mut rows = self.db().conn().query(&sql, [sub_pnl_id]).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Fetch a single history entry by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the entry does not exist.
    pub async fn get_history(&self, id: i64) -> Result<HistoryEntry, DatabaseError> {
        let sql = format!("SELECT {HISTORY_COLUMNS} FROM metrics_history WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_entry(&row)
    }

    /// Delete a single history entry. The only supported removal; entries
    /// are never rewritten.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the entry does not exist.
    pub async fn delete_history(&self, id: i64) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM metrics_history WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qal_core::Snapshot;
    use serde_json::json;

    use crate::test_support::helpers::{create_test_pnl, test_service};

    fn snapshot(value: serde_json::Value) -> Snapshot {
        Snapshot::parse(&value.to_string()).unwrap()
    }

    async fn insert_at(svc: &MetricsService, entity_id: i64, created_at: &str) {
        svc.db()
            .conn()
            .execute(
                "INSERT INTO metrics_history (
                     entity_type, entity_id, change_type, metrics_data, created_at
                 ) VALUES ('pnl_metrics', ?1, 'update', '{}', ?2)",
                libsql::params![entity_id, created_at],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn append_then_get_roundtrip() {
        let svc = test_service().await;
        let draft = NewHistoryEntry::created(
            MetricsEntityType::PnlMetrics,
            3,
            &snapshot(json!({"total_bugs_logged": 5})),
        )
        .with_pnl(3)
        .described("PnL metrics created")
        .by(Some(ActorRef {
            id: 12,
            email: Some("qa-lead@example.com".to_string()),
        }));

        let appended = svc.append_history(draft).await.unwrap();
        let fetched = svc.get_history(appended.id).await.unwrap();

        assert_eq!(fetched, appended);
        assert_eq!(fetched.user.as_ref().map(|u| u.id), Some(12));
        assert_eq!(
            fetched.user.and_then(|u| u.email).as_deref(),
            Some("qa-lead@example.com")
        );
        assert_eq!(fetched.previous_values, None);
    }

    #[tokio::test]
    async fn listing_breaks_timestamp_ties_by_id() {
        let svc = test_service().await;
        insert_at(&svc, 1, "2026-03-01T09:00:00+00:00").await;
        insert_at(&svc, 2, "2026-03-01T09:00:00+00:00").await;
        insert_at(&svc, 3, "2026-03-01T08:00:00+00:00").await;

        let entries = svc.list_history(&HistoryFilter::default()).await.unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn filters_narrow_by_type_and_change() {
        let svc = test_service().await;
        for (et, ct) in [
            ("pnl_metrics", "create"),
            ("pnl_metrics", "update"),
            ("sub_pnl_metrics", "update"),
        ] {
            svc.db()
                .conn()
                .execute(
                    "INSERT INTO metrics_history (
                         entity_type, entity_id, change_type, metrics_data, created_at
                     ) VALUES (?1, 1, ?2, '{}', ?3)",
                    libsql::params![et, ct, Utc::now().to_rfc3339()],
                )
                .await
                .unwrap();
        }

        let filter = HistoryFilter {
            entity_type: Some(MetricsEntityType::PnlMetrics),
            change_type: Some(ChangeType::Update),
            ..HistoryFilter::default()
        };
        let entries = svc.list_history(&filter).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_type, MetricsEntityType::PnlMetrics);
        assert_eq!(entries[0].change_type, ChangeType::Update);
    }

    #[tokio::test]
    async fn limit_and_offset_page_through() {
        let svc = test_service().await;
        for i in 0..5 {
            insert_at(&svc, i, &format!("2026-03-01T0{i}:00:00+00:00")).await;
        }

        let filter = HistoryFilter {
            limit: Some(2),
            offset: Some(2),
            ..HistoryFilter::default()
        };
        let entries = svc.list_history(&filter).await.unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn get_missing_entry_is_no_result() {
        let svc = test_service().await;
        let result = svc.get_history(404).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn delete_entry_then_gone() {
        let svc = test_service().await;
        let draft = NewHistoryEntry::created(
            MetricsEntityType::SubPnlMetrics,
            1,
            &snapshot(json!({})),
        );
        let entry = svc.append_history(draft).await.unwrap();

        svc.delete_history(entry.id).await.unwrap();
        let result = svc.get_history(entry.id).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));

        let result = svc.delete_history(entry.id).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn scoped_listing_requires_existing_scope() {
        let svc = test_service().await;
        let result = svc.list_history_by_pnl(77).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
        let result = svc.list_history_by_sub_pnl(77).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn entries_survive_owner_deletion() {
        let svc = test_service().await;
        let pnl_id = create_test_pnl(&svc, "ePharmacy").await;
        let update = crate::updates::pnl_metrics::PnlMetricsUpdateBuilder::new()
            .total_bugs_logged(3)
            .build();
        svc.upsert_pnl_metrics(pnl_id, update, None).await.unwrap();

        svc.db()
            .conn()
            .execute("DELETE FROM pnls WHERE id = ?1", [pnl_id])
            .await
            .unwrap();

        let filter = HistoryFilter {
            entity_type: Some(MetricsEntityType::PnlMetrics),
            entity_id: Some(pnl_id),
            ..HistoryFilter::default()
        };
        let entries = svc.list_history(&filter).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].change_type, ChangeType::Create);
    }
}
