//! Composite response types returned by read endpoints.
//!
//! These structs define the JSON shape of the dashboard and listing
//! endpoints: an entity with its metrics record inlined. The metrics field
//! is `null` until the record's first write creates it.

use serde::{Deserialize, Serialize};

use crate::entities::{Pnl, PnlMetrics, SubPnl, SubPnlDetailMetrics, SubPnlMetrics};

/// A PnL with its metrics record, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PnlWithMetrics {
    #[serde(flatten)]
    pub pnl: Pnl,
    pub metrics: Option<PnlMetrics>,
}

/// A Sub-PnL with its metrics record, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubPnlWithMetrics {
    #[serde(flatten)]
    pub sub_pnl: SubPnl,
    pub metrics: Option<SubPnlMetrics>,
}

/// A Sub-PnL with its detail-metrics record, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubPnlWithDetail {
    #[serde(flatten)]
    pub sub_pnl: SubPnl,
    pub detail_metrics: Option<SubPnlDetailMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn with_metrics_flattens_entity_fields() {
        let now = Utc::now();
        let view = PnlWithMetrics {
            pnl: Pnl {
                id: 3,
                name: "ePharmacy".into(),
                description: None,
                created_at: now,
                updated_at: now,
            },
            metrics: None,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["name"], "ePharmacy");
        assert_eq!(value["metrics"], serde_json::Value::Null);
    }
}
