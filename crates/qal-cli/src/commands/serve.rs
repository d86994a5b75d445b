use qal_config::QalConfig;
use qal_db::service::MetricsService;
use qal_server::AppState;

use crate::cli::{GlobalFlags, ServeArgs};
use crate::commands::db_path;

/// Handle `qal serve`.
pub async fn run(args: &ServeArgs, config: &QalConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let path = db_path(flags, &config).to_owned();
    let service = MetricsService::new_local(&path).await?;
    tracing::debug!(database = %path, "database opened");

    let bind_addr = config.server.bind_addr();
    let state = AppState::new(service, config);
    qal_server::serve(state, &bind_addr).await
}
