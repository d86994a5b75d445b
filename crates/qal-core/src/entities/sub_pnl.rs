use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A child grouping owned by a PnL. Deleting the PnL cascades here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubPnl {
    pub id: i64,
    pub pnl_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The metrics record owned 1:1 by a Sub-PnL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubPnlMetrics {
    pub id: i64,
    pub sub_pnl_id: i64,
    pub features_shipped: i64,
    pub total_testcases_executed: i64,
    pub total_bugs_logged: i64,
    pub regression_bugs_found: i64,
    pub sanity_time_avg_hours: f64,
    pub automation_coverage_percent: f64,
    pub escaped_bugs: i64,
    pub test_coverage_percent: f64,
    pub testcases_per_bug: f64,
    pub bugs_per_100_tests: f64,
    pub updated_at: DateTime<Utc>,
}

/// The extended detail-metrics record owned 1:1 by a Sub-PnL. Carries the
/// full measurement set plus versioning flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubPnlDetailMetrics {
    pub id: i64,
    pub sub_pnl_id: i64,
    pub features_shipped: i64,
    pub total_testcases_executed: i64,
    pub total_bugs_logged: i64,
    pub testcase_peer_review: i64,
    pub regression_bugs_found: i64,
    pub sanity_time_avg_hours: f64,
    pub api_test_time_avg_hours: f64,
    pub automation_coverage_percent: f64,
    pub escaped_bugs: i64,
    pub test_coverage_percent: f64,
    pub testcases_per_bug: f64,
    pub bugs_per_100_tests: f64,
    pub version: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
