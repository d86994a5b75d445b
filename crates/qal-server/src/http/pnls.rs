//! PnL entity handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use qal_core::entities::Pnl;

use crate::AppState;
use crate::error::{ApiError, not_found_as, storage};
use crate::http::parse_id;

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePnlRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub(crate) async fn list(State(state): State<AppState>) -> Result<Json<Vec<Pnl>>, ApiError> {
    let pnls = state.service.list_pnls().await.map_err(storage)?;
    Ok(Json(pnls))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePnlRequest>,
) -> Result<Json<Pnl>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }
    let pnl = state
        .service
        .create_pnl(&body.name, body.description.as_deref())
        .await
        .map_err(storage)?;
    Ok(Json(pnl))
}

pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
) -> Result<Json<Pnl>, ApiError> {
    let id = parse_id(&pnl_id)?;
    let pnl = state
        .service
        .get_pnl(id)
        .await
        .map_err(|e| not_found_as(e, "PnL not found"))?;
    Ok(Json(pnl))
}
