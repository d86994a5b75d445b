use qal_config::QalConfig;
use qal_db::service::MetricsService;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::commands::db_path;
use crate::output::output;

/// Handle `qal init-db`. Opening the database runs migrations.
pub async fn run(config: &QalConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = db_path(flags, config);
    let service = MetricsService::new_local(path).await?;

    let tables = list_tables(&service).await?;
    output(
        &json!({
            "status": "initialized",
            "database": path,
            "tables": tables,
        }),
        flags.format,
    )
}

async fn list_tables(service: &MetricsService) -> anyhow::Result<Vec<String>> {
    let mut rows = service
        .db()
        .conn()
        .query(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
            (),
        )
        .await?;

    let mut tables = Vec::new();
    while let Some(row) = rows.next().await? {
        tables.push(row.get::<String>(0)?);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qal_db::service::MetricsService;

    use super::list_tables;

    #[tokio::test]
    async fn reports_all_migrated_tables() {
        let service = MetricsService::new_local(":memory:").await.unwrap();
        let tables = list_tables(&service).await.unwrap();

        for expected in [
            "metrics_history",
            "pnl_metrics",
            "pnls",
            "sub_pnl_detail_metrics",
            "sub_pnl_metrics",
            "sub_pnls",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
        assert_eq!(tables.first().map(String::as_str), Some("metrics_history"));
    }
}
