use chrono::{DateTime, Utc};
use qal_config::QalConfig;
use qal_core::Snapshot;
use qal_core::entities::{ActorRef, HistoryEntry};
use qal_core::enums::{ChangeType, MetricsEntityType};
use qal_db::repos::history::HistoryFilter;
use qal_db::service::MetricsService;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{GlobalFlags, HistoryArgs};
use crate::commands::db_path;
use crate::output::output;

/// Handle `qal history`.
pub async fn run(args: &HistoryArgs, config: &QalConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = db_path(flags, config);
    let service = MetricsService::new_local(path).await?;

    let entries = fetch(args, config, &service).await?;
    let decoded = entries.iter().map(DecodedEntry::from_entry).collect::<Vec<_>>();
    output(&decoded, flags.format)
}

async fn fetch(
    args: &HistoryArgs,
    config: &QalConfig,
    service: &MetricsService,
) -> anyhow::Result<Vec<HistoryEntry>> {
    let filter = HistoryFilter {
        entity_type: args
            .entity_type
            .as_deref()
            .map(|value| parse_enum::<MetricsEntityType>(value, "entity-type"))
            .transpose()?,
        entity_id: args.entity_id,
        change_type: args
            .change_type
            .as_deref()
            .map(|value| parse_enum::<ChangeType>(value, "change-type"))
            .transpose()?,
        limit: Some(args.limit.unwrap_or(config.history.default_limit)),
        offset: args.offset,
    };

    service.list_history(&filter).await.map_err(Into::into)
}

/// Display view of a history entry with snapshot strings decoded to JSON.
#[derive(Debug, Serialize)]
struct DecodedEntry {
    id: i64,
    entity_type: MetricsEntityType,
    entity_id: i64,
    pnl_id: Option<i64>,
    sub_pnl_id: Option<i64>,
    change_type: ChangeType,
    metrics_data: Value,
    previous_values: Option<Value>,
    change_description: Option<String>,
    user: Option<ActorRef>,
    created_at: DateTime<Utc>,
}

impl DecodedEntry {
    fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            pnl_id: entry.pnl_id,
            sub_pnl_id: entry.sub_pnl_id,
            change_type: entry.change_type,
            metrics_data: decode_snapshot(&entry.metrics_data),
            previous_values: entry.previous_values.as_deref().map(decode_snapshot),
            change_description: entry.change_description.clone(),
            user: entry.user.clone(),
            created_at: entry.created_at,
        }
    }
}

/// Decode a stored snapshot for display. Undecodable payloads render as an
/// error marker instead of failing the whole listing.
fn decode_snapshot(raw: &str) -> Value {
    Snapshot::parse(raw).map_or_else(
        |_| serde_json::json!({ "error": "invalid data format" }),
        Snapshot::into_value,
    )
}

/// Parse a snake_case enum value using serde deserialization.
fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qal_config::QalConfig;
    use qal_core::Snapshot;
    use qal_core::entities::NewHistoryEntry;
    use qal_core::enums::{ChangeType, MetricsEntityType};
    use qal_db::service::MetricsService;
    use serde_json::json;

    use super::{DecodedEntry, decode_snapshot, fetch, parse_enum};
    use crate::cli::HistoryArgs;

    fn history_args() -> HistoryArgs {
        HistoryArgs {
            entity_type: None,
            entity_id: None,
            change_type: None,
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn parses_hyphenated_entity_type() {
        let parsed: MetricsEntityType =
            parse_enum("sub-pnl-metrics", "entity-type").expect("should parse");
        assert_eq!(parsed, MetricsEntityType::SubPnlMetrics);
    }

    #[test]
    fn errors_on_invalid_change_type() {
        let err = parse_enum::<ChangeType>("made", "change-type").expect_err("should fail");
        assert!(err.to_string().contains("invalid change-type 'made'"));
    }

    #[test]
    fn undecodable_snapshot_renders_error_marker() {
        let decoded = decode_snapshot("{not valid json");
        assert_eq!(decoded, json!({ "error": "invalid data format" }));
    }

    #[test]
    fn decoded_entry_keeps_valid_payloads() {
        let snapshot = Snapshot::parse(&json!({ "escaped_bugs": 2 }).to_string()).unwrap();
        let entry = qal_core::entities::HistoryEntry::from_draft(
            NewHistoryEntry::created(MetricsEntityType::PnlMetrics, 1, &snapshot),
            7,
            chrono::Utc::now(),
        );

        let decoded = DecodedEntry::from_entry(&entry);
        assert_eq!(decoded.metrics_data, json!({ "escaped_bugs": 2 }));
        assert_eq!(decoded.previous_values, None);
    }

    #[tokio::test]
    async fn fetch_limit_defaults_from_config() {
        let service = MetricsService::new_local(":memory:").await.unwrap();
        let snapshot = Snapshot::parse("{}").unwrap();
        for n in 0..3 {
            service
                .append_history(NewHistoryEntry::created(
                    MetricsEntityType::PnlMetrics,
                    n,
                    &snapshot,
                ))
                .await
                .unwrap();
        }

        let config = QalConfig::default();
        let entries = fetch(&history_args(), &config, &service).await.unwrap();
        assert_eq!(entries.len(), 3);

        let mut args = history_args();
        args.limit = Some(2);
        let entries = fetch(&args, &config, &service).await.unwrap();
        assert_eq!(entries.len(), 2);
    }
}
