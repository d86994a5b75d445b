//! # qal-server
//!
//! Axum REST surface for QAlytics: PnL / Sub-PnL entities, their metrics
//! records, and the metrics history trail. Handlers are thin wrappers over
//! [`qal_db::service::MetricsService`]; every error becomes a JSON
//! `{"error": "..."}` envelope with the matching status code.

pub mod error;

mod actor;
mod http;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

use qal_config::QalConfig;
use qal_db::service::MetricsService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MetricsService>,
    pub config: Arc<QalConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(service: MetricsService, config: QalConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Assemble the full route table.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::meta::root))
        .route("/health", get(http::meta::health))
        .route("/dashboard", get(http::meta::dashboard))
        .route("/pnls", get(http::pnls::list).post(http::pnls::create))
        .route("/pnls/{pnl_id}", get(http::pnls::get_one))
        .route(
            "/pnls/{pnl_id}/sub-pnls",
            get(http::sub_pnls::list).post(http::sub_pnls::create),
        )
        .route(
            "/pnls/{pnl_id}/metrics",
            get(http::metrics::get_pnl_metrics)
                .put(http::metrics::put_pnl_metrics)
                .delete(http::metrics::delete_pnl_metrics),
        )
        .route(
            "/pnls/{pnl_id}/metrics-history",
            get(http::history::list_by_pnl),
        )
        .route("/sub-pnls/{sub_pnl_id}", get(http::sub_pnls::get_one))
        .route(
            "/sub-pnls/{sub_pnl_id}/metrics",
            get(http::metrics::get_sub_pnl_metrics)
                .put(http::metrics::put_sub_pnl_metrics)
                .delete(http::metrics::delete_sub_pnl_metrics),
        )
        .route(
            "/sub-pnls/{sub_pnl_id}/detail-metrics",
            get(http::metrics::get_detail_metrics)
                .put(http::metrics::put_detail_metrics)
                .delete(http::metrics::delete_detail_metrics),
        )
        .route(
            "/sub-pnls/{sub_pnl_id}/metrics-history",
            get(http::history::list_by_sub_pnl),
        )
        .route("/metrics-history", get(http::history::list))
        .route(
            "/metrics-history/{history_id}",
            get(http::history::get_one).delete(http::history::delete_one),
        )
        .with_state(state)
}

/// Bind and serve until SIGTERM/SIGINT.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("qalytics server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> AppState {
        let service = MetricsService::new_local(":memory:").await.unwrap();
        AppState::new(service, QalConfig::default())
    }

    #[tokio::test]
    async fn router_builds_with_full_route_table() {
        let state = test_state().await;
        let _app = build_router(state);
    }

    #[tokio::test]
    async fn state_clones_share_the_service() {
        let state = test_state().await;
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.service, &clone.service));
        assert_eq!(clone.config.history.default_limit, 50);
    }
}
