//! Sub-PnL entity handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use qal_core::entities::SubPnl;
use qal_core::responses::{SubPnlWithDetail, SubPnlWithMetrics};

use crate::AppState;
use crate::error::{ApiError, not_found_as};
use crate::http::parse_id;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSubPnlRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A PnL's Sub-PnLs, each with its metrics record (null until first write).
pub(crate) async fn list(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
) -> Result<Json<Vec<SubPnlWithMetrics>>, ApiError> {
    let id = parse_id(&pnl_id)?;
    let views = state
        .service
        .list_sub_pnls_with_metrics(id)
        .await
        .map_err(|e| not_found_as(e, "PnL not found"))?;
    Ok(Json(views))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
    Json(body): Json<CreateSubPnlRequest>,
) -> Result<Json<SubPnl>, ApiError> {
    let id = parse_id(&pnl_id)?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }
    let sub_pnl = state
        .service
        .create_sub_pnl(id, &body.name, body.description.as_deref())
        .await
        .map_err(|e| not_found_as(e, "PnL not found"))?;
    Ok(Json(sub_pnl))
}

/// A Sub-PnL with its detail-metrics record (null until first write).
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
) -> Result<Json<SubPnlWithDetail>, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let view = state
        .service
        .get_sub_pnl_with_detail(id)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL not found"))?;
    Ok(Json(view))
}
