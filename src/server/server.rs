use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, mark_up, Metrics};
use crate::observability::routes::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
}

impl AppState {
    pub fn new(metrics: &Metrics) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
        }
    }
}

/// Serve `/metrics` when enabled; returns immediately otherwise.
pub async fn start(settings_config: &SettingsConfig) -> Result<()> {
    mark_up().await;
    let metrics = get_metrics().await;

    if !settings_config.metrics.is_enabled {
        info!("metrics endpoint disabled");
        return Ok(());
    }

    let state = AppState::new(metrics);
    let app = Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding metrics server to {}", bind_addr))?;
    info!(address = %bind_addr, path = %settings_config.metrics.path, "metrics server listening");
    axum::serve(listener, app).await.context("metrics server failed")?;

    Ok(())
}
