use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ChangeType, MetricsEntityType};
use crate::snapshot::Snapshot;

/// Who made a change, when request identity was supplied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorRef {
    pub id: i64,
    pub email: Option<String>,
}

/// An append-only history entry recording one tracked-record mutation.
///
/// `entity_id` is the id of the owning PnL or Sub-PnL; `entity_type` says
/// which of the owner's metrics records changed. `metrics_data` and
/// `previous_values` are raw snapshot strings and stay uninterpreted
/// everywhere except display edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub entity_type: MetricsEntityType,
    pub entity_id: i64,
    pub pnl_id: Option<i64>,
    pub sub_pnl_id: Option<i64>,
    pub change_type: ChangeType,
    pub metrics_data: String,
    pub previous_values: Option<String>,
    pub change_description: Option<String>,
    pub user: Option<ActorRef>,
    pub created_at: DateTime<Utc>,
}

/// A draft entry before the store assigns `id` and `created_at`.
///
/// The three constructors encode the snapshot rules per change kind: a
/// create carries no previous state, an update carries before and after,
/// a delete records the final state on both sides. `previous_values` being
/// `None` exactly for creates is therefore structural.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub entity_type: MetricsEntityType,
    pub entity_id: i64,
    pub pnl_id: Option<i64>,
    pub sub_pnl_id: Option<i64>,
    pub change_type: ChangeType,
    pub metrics_data: String,
    pub previous_values: Option<String>,
    pub change_description: Option<String>,
    pub user: Option<ActorRef>,
}

impl NewHistoryEntry {
    /// Draft for a record that was just created.
    #[must_use]
    pub fn created(entity_type: MetricsEntityType, entity_id: i64, current: &Snapshot) -> Self {
        Self {
            entity_type,
            entity_id,
            pnl_id: None,
            sub_pnl_id: None,
            change_type: ChangeType::Create,
            metrics_data: current.encode(),
            previous_values: None,
            change_description: None,
            user: None,
        }
    }

    /// Draft for a record that was updated in place.
    #[must_use]
    pub fn updated(
        entity_type: MetricsEntityType,
        entity_id: i64,
        previous: &Snapshot,
        current: &Snapshot,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            pnl_id: None,
            sub_pnl_id: None,
            change_type: ChangeType::Update,
            metrics_data: current.encode(),
            previous_values: Some(previous.encode()),
            change_description: None,
            user: None,
        }
    }

    /// Draft for a record that was removed. Both snapshots hold the state
    /// at deletion.
    #[must_use]
    pub fn deleted(entity_type: MetricsEntityType, entity_id: i64, last: &Snapshot) -> Self {
        Self {
            entity_type,
            entity_id,
            pnl_id: None,
            sub_pnl_id: None,
            change_type: ChangeType::Delete,
            metrics_data: last.encode(),
            previous_values: Some(last.encode()),
            change_description: None,
            user: None,
        }
    }

    /// Link the entry to its owning PnL.
    #[must_use]
    pub const fn with_pnl(mut self, pnl_id: i64) -> Self {
        self.pnl_id = Some(pnl_id);
        self
    }

    /// Link the entry to its owning Sub-PnL and that Sub-PnL's parent.
    #[must_use]
    pub const fn with_sub_pnl(mut self, pnl_id: i64, sub_pnl_id: i64) -> Self {
        self.pnl_id = Some(pnl_id);
        self.sub_pnl_id = Some(sub_pnl_id);
        self
    }

    /// Attach a human-readable change summary.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.change_description = Some(description.into());
        self
    }

    /// Attach the acting user, when known.
    #[must_use]
    pub fn by(mut self, user: Option<ActorRef>) -> Self {
        self.user = user;
        self
    }
}

impl HistoryEntry {
    /// Promote a draft with store-assigned id and timestamp.
    #[must_use]
    pub fn from_draft(draft: NewHistoryEntry, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            pnl_id: draft.pnl_id,
            sub_pnl_id: draft.sub_pnl_id,
            change_type: draft.change_type,
            metrics_data: draft.metrics_data,
            previous_values: draft.previous_values,
            change_description: draft.change_description,
            user: draft.user,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        Snapshot::parse(&value.to_string()).unwrap()
    }

    #[test]
    fn created_draft_has_no_previous() {
        let draft = NewHistoryEntry::created(
            MetricsEntityType::PnlMetrics,
            4,
            &snapshot(json!({"total_bugs_logged": 3})),
        );
        assert_eq!(draft.change_type, ChangeType::Create);
        assert_eq!(draft.previous_values, None);
        assert_eq!(draft.metrics_data, json!({"total_bugs_logged": 3}).to_string());
    }

    #[test]
    fn updated_draft_carries_both_snapshots() {
        let draft = NewHistoryEntry::updated(
            MetricsEntityType::SubPnlMetrics,
            9,
            &snapshot(json!({"escaped_bugs": 1})),
            &snapshot(json!({"escaped_bugs": 2})),
        );
        assert_eq!(draft.change_type, ChangeType::Update);
        assert_eq!(draft.previous_values, Some(json!({"escaped_bugs": 1}).to_string()));
        assert_eq!(draft.metrics_data, json!({"escaped_bugs": 2}).to_string());
    }

    #[test]
    fn deleted_draft_mirrors_last_state() {
        let last = snapshot(json!({"features_shipped": 7}));
        let draft = NewHistoryEntry::deleted(MetricsEntityType::SubPnlDetailMetrics, 2, &last);
        assert_eq!(draft.change_type, ChangeType::Delete);
        assert_eq!(draft.metrics_data, draft.previous_values.clone().unwrap());
    }

    #[test]
    fn builder_chain_sets_linkage_and_actor() {
        let draft = NewHistoryEntry::created(
            MetricsEntityType::SubPnlMetrics,
            5,
            &snapshot(json!({})),
        )
        .with_sub_pnl(1, 5)
        .described("Sub-PnL metrics created")
        .by(Some(ActorRef { id: 1, email: Some("qa@example.com".into()) }));

        assert_eq!(draft.pnl_id, Some(1));
        assert_eq!(draft.sub_pnl_id, Some(5));
        assert_eq!(draft.change_description.as_deref(), Some("Sub-PnL metrics created"));
        assert_eq!(draft.user.unwrap().id, 1);
    }

    #[test]
    fn entry_serializes_optional_fields_as_null() {
        let entry = HistoryEntry::from_draft(
            NewHistoryEntry::created(
                MetricsEntityType::PnlMetrics,
                1,
                &snapshot(json!({"total_bugs_logged": 0})),
            ),
            10,
            chrono::Utc::now(),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["previous_values"], serde_json::Value::Null);
        assert_eq!(value["user"], serde_json::Value::Null);
        assert_eq!(value["change_type"], "create");
        assert!(value["metrics_data"].is_string());
    }
}
