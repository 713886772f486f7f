use crate::api::{self, AppState};
use crate::infrastructure::config::Settings;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::signal;

/// Builds the router, adding `/metrics` when metrics are enabled.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed.
pub fn build_app(config: &Settings, state: AppState) -> anyhow::Result<Router> {
    let app = api::router(state, &config.cors);
    if !config.telemetry.metrics {
        return Ok(app);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))?;
    Ok(app.route("/metrics", get(move || std::future::ready(handle.render()))))
}

/// Serves the agent until a shutdown signal arrives.
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters an error while running.
pub async fn run_server(config: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_app(config, state)?;
    let addr = config.bind_address().to_socket_addr()?;

    tracing::info!("Agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
