//! Change types and tracked-record kinds for metrics history.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! The `as_str` forms are the stable strings written to SQL columns and
//! compared in query filters.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ChangeType
// ---------------------------------------------------------------------------

/// Kind of mutation a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

impl ChangeType {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MetricsEntityType
// ---------------------------------------------------------------------------

/// Which kind of tracked metrics record a history entry belongs to.
///
/// The `entity_id` on an entry is always the id of the owning PnL or
/// Sub-PnL, not the metrics row itself; this tag says which of the owner's
/// records changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsEntityType {
    PnlMetrics,
    SubPnlMetrics,
    SubPnlDetailMetrics,
}

impl MetricsEntityType {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PnlMetrics => "pnl_metrics",
            Self::SubPnlMetrics => "sub_pnl_metrics",
            Self::SubPnlDetailMetrics => "sub_pnl_detail_metrics",
        }
    }
}

impl fmt::Display for MetricsEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(change_type_create, ChangeType, ChangeType::Create, "create");
    test_serde_roundtrip!(change_type_update, ChangeType, ChangeType::Update, "update");
    test_serde_roundtrip!(change_type_delete, ChangeType, ChangeType::Delete, "delete");

    test_serde_roundtrip!(
        entity_type_pnl_metrics,
        MetricsEntityType,
        MetricsEntityType::PnlMetrics,
        "pnl_metrics"
    );
    test_serde_roundtrip!(
        entity_type_sub_pnl_metrics,
        MetricsEntityType,
        MetricsEntityType::SubPnlMetrics,
        "sub_pnl_metrics"
    );
    test_serde_roundtrip!(
        entity_type_sub_pnl_detail_metrics,
        MetricsEntityType,
        MetricsEntityType::SubPnlDetailMetrics,
        "sub_pnl_detail_metrics"
    );

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ChangeType::Update.to_string(), "update");
        assert_eq!(
            MetricsEntityType::SubPnlDetailMetrics.to_string(),
            "sub_pnl_detail_metrics"
        );
    }
}
