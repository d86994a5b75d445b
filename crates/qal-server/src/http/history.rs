//! Metrics history handlers.
//!
//! Snapshot strings pass through untouched; clients decode them. The
//! global listing pages with `limit`/`offset`, defaulting the limit from
//! configuration.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use qal_core::entities::HistoryEntry;
use qal_core::enums::{ChangeType, MetricsEntityType};
use qal_db::repos::history::HistoryFilter;

use crate::AppState;
use crate::error::{ApiError, not_found_as, storage};
use crate::http::parse_id;

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryListQuery {
    pub entity_type: Option<MetricsEntityType>,
    pub entity_id: Option<i64>,
    pub change_type: Option<ChangeType>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<HistoryListQuery>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let filter = HistoryFilter {
        entity_type: query.entity_type,
        entity_id: query.entity_id,
        change_type: query.change_type,
        limit: Some(query.limit.unwrap_or(state.config.history.default_limit)),
        offset: query.offset,
    };
    let entries = state.service.list_history(&filter).await.map_err(storage)?;
    Ok(Json(entries))
}

/// Everything linked to the PnL, its own records and its Sub-PnLs' alike.
pub(crate) async fn list_by_pnl(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let id = parse_id(&pnl_id)?;
    let entries = state
        .service
        .list_history_by_pnl(id)
        .await
        .map_err(|e| not_found_as(e, "PnL not found"))?;
    Ok(Json(entries))
}

pub(crate) async fn list_by_sub_pnl(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let entries = state
        .service
        .list_history_by_sub_pnl(id)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL not found"))?;
    Ok(Json(entries))
}

pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(history_id): Path<String>,
) -> Result<Json<HistoryEntry>, ApiError> {
    let id = parse_id(&history_id)?;
    let entry = state
        .service
        .get_history(id)
        .await
        .map_err(|e| not_found_as(e, "Metrics history not found"))?;
    Ok(Json(entry))
}

pub(crate) async fn delete_one(
    State(state): State<AppState>,
    Path(history_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&history_id)?;
    state
        .service
        .delete_history(id)
        .await
        .map_err(|e| not_found_as(e, "Metrics history not found"))?;
    Ok(StatusCode::NO_CONTENT)
}
