//! Sub-PnL detail-metrics update builder.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubPnlDetailUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_shipped: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_testcases_executed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bugs_logged: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testcase_peer_review: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regression_bugs_found: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanity_time_avg_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_test_time_avg_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_coverage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escaped_bugs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_coverage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testcases_per_bug: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs_per_100_tests: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct SubPnlDetailUpdateBuilder(SubPnlDetailUpdate);

impl SubPnlDetailUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(SubPnlDetailUpdate::default())
    }

    #[must_use]
    pub const fn features_shipped(mut self, val: i64) -> Self {
        self.0.features_shipped = Some(val);
        self
    }

    #[must_use]
    pub const fn total_testcases_executed(mut self, val: i64) -> Self {
        self.0.total_testcases_executed = Some(val);
        self
    }

    #[must_use]
    pub const fn total_bugs_logged(mut self, val: i64) -> Self {
        self.0.total_bugs_logged = Some(val);
        self
    }

    #[must_use]
    pub const fn testcase_peer_review(mut self, val: i64) -> Self {
        self.0.testcase_peer_review = Some(val);
        self
    }

    #[must_use]
    pub const fn regression_bugs_found(mut self, val: i64) -> Self {
        self.0.regression_bugs_found = Some(val);
        self
    }

    #[must_use]
    pub const fn sanity_time_avg_hours(mut self, val: f64) -> Self {
        self.0.sanity_time_avg_hours = Some(val);
        self
    }

    #[must_use]
    pub const fn api_test_time_avg_hours(mut self, val: f64) -> Self {
        self.0.api_test_time_avg_hours = Some(val);
        self
    }

    #[must_use]
    pub const fn automation_coverage_percent(mut self, val: f64) -> Self {
        self.0.automation_coverage_percent = Some(val);
        self
    }

    #[must_use]
    pub const fn escaped_bugs(mut self, val: i64) -> Self {
        self.0.escaped_bugs = Some(val);
        self
    }

    #[must_use]
    pub const fn test_coverage_percent(mut self, val: f64) -> Self {
        self.0.test_coverage_percent = Some(val);
        self
    }

    #[must_use]
    pub const fn testcases_per_bug(mut self, val: f64) -> Self {
        self.0.testcases_per_bug = Some(val);
        self
    }

    #[must_use]
    pub const fn bugs_per_100_tests(mut self, val: f64) -> Self {
        self.0.bugs_per_100_tests = Some(val);
        self
    }

    #[must_use]
    pub const fn version(mut self, val: i64) -> Self {
        self.0.version = Some(val);
        self
    }

    #[must_use]
    pub fn description(mut self, val: impl Into<String>) -> Self {
        self.0.description = Some(val.into());
        self
    }

    #[must_use]
    pub const fn is_active(mut self, val: bool) -> Self {
        self.0.is_active = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> SubPnlDetailUpdate {
        self.0
    }
}

impl Default for SubPnlDetailUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
