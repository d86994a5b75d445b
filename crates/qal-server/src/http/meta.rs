//! Banner, health, and dashboard handlers.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use qal_core::responses::PnlWithMetrics;

use crate::AppState;
use crate::error::{ApiError, storage};

pub(crate) async fn root() -> Json<Value> {
    Json(json!({
        "message": "QAlytics API v2.0 - Hierarchical PnL Quality Analytics Platform"
    }))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "timestamp": Utc::now()}))
}

/// All PnLs with their metrics records; `metrics` is null until the
/// record's first write.
pub(crate) async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<PnlWithMetrics>>, ApiError> {
    let views = state.service.list_pnls_with_metrics().await.map_err(storage)?;
    Ok(Json(views))
}
