//! Metrics record handlers for all three tracked kinds.
//!
//! GET returns the stored record and is 404 until the first PUT. PUT is a
//! partial update that creates the record when absent; every PUT and
//! DELETE that changes state records one history entry.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};

use qal_core::entities::{PnlMetrics, SubPnlDetailMetrics, SubPnlMetrics};
use qal_db::updates::pnl_metrics::PnlMetricsUpdate;
use qal_db::updates::sub_pnl_detail::SubPnlDetailUpdate;
use qal_db::updates::sub_pnl_metrics::SubPnlMetricsUpdate;

use crate::AppState;
use crate::actor::actor_from_headers;
use crate::error::{ApiError, not_found_as};
use crate::http::parse_id;

// ---------------------------------------------------------------------------
// PnL metrics
// ---------------------------------------------------------------------------

pub(crate) async fn get_pnl_metrics(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
) -> Result<Json<PnlMetrics>, ApiError> {
    let id = parse_id(&pnl_id)?;
    let metrics = state
        .service
        .get_pnl_metrics(id)
        .await
        .map_err(|e| not_found_as(e, "PnL metrics not found"))?;
    Ok(Json(metrics))
}

pub(crate) async fn put_pnl_metrics(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<PnlMetricsUpdate>,
) -> Result<Json<PnlMetrics>, ApiError> {
    let id = parse_id(&pnl_id)?;
    let actor = actor_from_headers(&headers);
    let metrics = state
        .service
        .upsert_pnl_metrics(id, update, actor)
        .await
        .map_err(|e| not_found_as(e, "PnL not found"))?;
    Ok(Json(metrics))
}

pub(crate) async fn delete_pnl_metrics(
    State(state): State<AppState>,
    Path(pnl_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&pnl_id)?;
    let actor = actor_from_headers(&headers);
    state
        .service
        .delete_pnl_metrics(id, actor)
        .await
        .map_err(|e| not_found_as(e, "PnL metrics not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Sub-PnL metrics
// ---------------------------------------------------------------------------

pub(crate) async fn get_sub_pnl_metrics(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
) -> Result<Json<SubPnlMetrics>, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let metrics = state
        .service
        .get_sub_pnl_metrics(id)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL metrics not found"))?;
    Ok(Json(metrics))
}

pub(crate) async fn put_sub_pnl_metrics(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<SubPnlMetricsUpdate>,
) -> Result<Json<SubPnlMetrics>, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let actor = actor_from_headers(&headers);
    let metrics = state
        .service
        .upsert_sub_pnl_metrics(id, update, actor)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL not found"))?;
    Ok(Json(metrics))
}

pub(crate) async fn delete_sub_pnl_metrics(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let actor = actor_from_headers(&headers);
    state
        .service
        .delete_sub_pnl_metrics(id, actor)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL metrics not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Sub-PnL detail metrics
// ---------------------------------------------------------------------------

pub(crate) async fn get_detail_metrics(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
) -> Result<Json<SubPnlDetailMetrics>, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let metrics = state
        .service
        .get_sub_pnl_detail_metrics(id)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL detail metrics not found"))?;
    Ok(Json(metrics))
}

pub(crate) async fn put_detail_metrics(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<SubPnlDetailUpdate>,
) -> Result<Json<SubPnlDetailMetrics>, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let actor = actor_from_headers(&headers);
    let metrics = state
        .service
        .upsert_sub_pnl_detail_metrics(id, update, actor)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL not found"))?;
    Ok(Json(metrics))
}

pub(crate) async fn delete_detail_metrics(
    State(state): State<AppState>,
    Path(sub_pnl_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&sub_pnl_id)?;
    let actor = actor_from_headers(&headers);
    state
        .service
        .delete_sub_pnl_detail_metrics(id, actor)
        .await
        .map_err(|e| not_found_as(e, "Sub PnL detail metrics not found"))?;
    Ok(StatusCode::NO_CONTENT)
}
