//! Sample dataset for demos and local development.
//!
//! Seeding goes through `MetricsService` rather than raw SQL, so every
//! metrics row it creates also records its `create` history entry.

use qal_config::QalConfig;
use qal_db::service::MetricsService;
use qal_db::updates::pnl_metrics::PnlMetricsUpdateBuilder;
use qal_db::updates::sub_pnl_detail::SubPnlDetailUpdateBuilder;
use qal_db::updates::sub_pnl_metrics::SubPnlMetricsUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::commands::db_path;
use crate::output::output;

struct PnlSeed {
    name: &'static str,
    description: &'static str,
    sub_pnls: &'static [(&'static str, &'static str)],
}

const SAMPLE_PNLS: [PnlSeed; 3] = [
    PnlSeed {
        name: "ePharmacy",
        description: "Online pharmacy platform with order management and delivery services",
        sub_pnls: &[
            ("Logistics", "Order fulfillment and delivery management"),
            ("Warehouse", "Inventory and stock management system"),
            ("Audit App", "Compliance and audit tracking application"),
            ("Finance", "Payment processing and financial reporting"),
        ],
    },
    PnlSeed {
        name: "eDiagnostics",
        description: "Digital diagnostics platform with lab management and reporting",
        sub_pnls: &[
            ("Lab Management", "Sample tracking and lab workflow"),
            ("Report Generation", "Automated report creation and delivery"),
            ("Patient Portal", "Patient access to test results and history"),
        ],
    },
    PnlSeed {
        name: "Telemedicine",
        description: "Video consultation platform with appointment and prescription management",
        sub_pnls: &[
            ("Video Platform", "Video call infrastructure and quality"),
            ("Appointment System", "Scheduling and calendar management"),
            ("Prescription Module", "Digital prescription and pharmacy integration"),
        ],
    },
];

/// Handle `qal seed`.
pub async fn run(config: &QalConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = db_path(flags, config);
    let service = MetricsService::new_local(path).await?;

    let summary = seed_database(&service).await?;
    output(
        &json!({
            "status": "seeded",
            "database": path,
            "pnls": summary.pnls,
            "sub_pnls": summary.sub_pnls,
        }),
        flags.format,
    )
}

#[derive(Debug)]
struct SeedSummary {
    pnls: usize,
    sub_pnls: usize,
}

async fn seed_database(service: &MetricsService) -> anyhow::Result<SeedSummary> {
    let existing = service.list_pnls().await?;
    if !existing.is_empty() {
        anyhow::bail!(
            "database already contains {} pnls; refusing to seed",
            existing.len()
        );
    }

    let mut sub_pnls = 0;
    for seed in &SAMPLE_PNLS {
        let pnl = service.create_pnl(seed.name, Some(seed.description)).await?;
        seed_pnl_metrics(service, pnl.id).await?;

        for (position, (name, description)) in seed.sub_pnls.iter().enumerate() {
            let sub_pnl = service
                .create_sub_pnl(pnl.id, name, Some(description))
                .await?;
            seed_sub_pnl_metrics(service, sub_pnl.id, position as i64).await?;
            sub_pnls += 1;
        }
        tracing::debug!(pnl = seed.name, "seeded sample pnl");
    }

    Ok(SeedSummary {
        pnls: SAMPLE_PNLS.len(),
        sub_pnls,
    })
}

async fn seed_pnl_metrics(service: &MetricsService, pnl_id: i64) -> anyhow::Result<()> {
    let scale = pnl_id as f64;
    let update = PnlMetricsUpdateBuilder::new()
        .total_testcases_executed(850 + pnl_id * 150)
        .total_bugs_logged(25 + pnl_id * 5)
        .escaped_bugs(3 + pnl_id)
        .test_coverage_percent(78.5 + scale * 2.5)
        .automation_coverage_percent(65.0 + scale * 5.0)
        .build();

    service.upsert_pnl_metrics(pnl_id, update, None).await?;
    Ok(())
}

async fn seed_sub_pnl_metrics(
    service: &MetricsService,
    sub_pnl_id: i64,
    position: i64,
) -> anyhow::Result<()> {
    let scale = position as f64;

    let metrics = SubPnlMetricsUpdateBuilder::new()
        .features_shipped(8 + position * 2)
        .total_testcases_executed(180 + position * 30)
        .total_bugs_logged(15 + position * 3)
        .regression_bugs_found(4 + position)
        .sanity_time_avg_hours(2.5 + scale * 0.5)
        .automation_coverage_percent(70.0 + scale * 5.0)
        .escaped_bugs(2 + position % 2)
        .build();
    service
        .upsert_sub_pnl_metrics(sub_pnl_id, metrics, None)
        .await?;

    let detail = SubPnlDetailUpdateBuilder::new()
        .features_shipped(8 + position * 2)
        .total_testcases_executed(180 + position * 30)
        .total_bugs_logged(15 + position * 3)
        .testcase_peer_review(120 + position * 20)
        .regression_bugs_found(4 + position)
        .sanity_time_avg_hours(2.5 + scale * 0.5)
        .api_test_time_avg_hours(1.8 + scale * 0.3)
        .automation_coverage_percent(70.0 + scale * 5.0)
        .escaped_bugs(2 + position % 2)
        .build();
    service
        .upsert_sub_pnl_detail_metrics(sub_pnl_id, detail, None)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qal_core::enums::ChangeType;
    use qal_db::repos::history::HistoryFilter;
    use qal_db::service::MetricsService;

    use super::seed_database;

    async fn test_service() -> MetricsService {
        MetricsService::new_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn seeding_creates_tracked_create_entries() {
        let service = test_service().await;
        let summary = seed_database(&service).await.unwrap();

        assert_eq!(summary.pnls, 3);
        assert_eq!(summary.sub_pnls, 10);

        // 3 pnl_metrics + 10 sub_pnl_metrics + 10 detail_metrics
        let filter = HistoryFilter {
            limit: Some(100),
            ..Default::default()
        };
        let entries = service.list_history(&filter).await.unwrap();
        assert_eq!(entries.len(), 23);
        assert!(entries.iter().all(|e| e.change_type == ChangeType::Create));
        assert!(entries.iter().all(|e| e.user.is_none()));
    }

    #[tokio::test]
    async fn seeded_metrics_follow_the_sample_formulas() {
        let service = test_service().await;
        seed_database(&service).await.unwrap();

        let metrics = service.get_pnl_metrics(1).await.unwrap();
        assert_eq!(metrics.total_testcases_executed, 1000);
        assert_eq!(metrics.escaped_bugs, 4);

        // First sub-pnl of the first pnl seeds at position 0
        let sub_metrics = service.get_sub_pnl_metrics(1).await.unwrap();
        assert_eq!(sub_metrics.features_shipped, 8);
        assert_eq!(sub_metrics.sanity_time_avg_hours, 2.5);
    }

    #[tokio::test]
    async fn reseeding_a_populated_database_is_refused() {
        let service = test_service().await;
        seed_database(&service).await.unwrap();

        let err = seed_database(&service).await.unwrap_err();
        assert!(err.to_string().contains("refusing to seed"));

        let pnls = service.list_pnls().await.unwrap();
        assert_eq!(pnls.len(), 3);
    }
}
