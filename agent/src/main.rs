//! WordPress agent server entry point.

use anyhow::Context;
use wp_agent::api::AppState;
use wp_agent::infrastructure::{audit, config::Settings, server, telemetry::TelemetryBuilder};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();

    let config = Settings::new().context("Failed to load configuration")?;

    TelemetryBuilder::from_settings(&config.telemetry, env!("CARGO_PKG_VERSION"))
        .init()
        .context("Failed to initialize telemetry")?;

    info!("WordPress Agent Starting...");

    let state = AppState::from_settings(&config).context("Failed to initialize tool context")?;
    info!(
        tools = state.dispatcher.registry().len(),
        sandbox_root = %config.sandbox.root.display(),
        "Tool registry ready"
    );

    let authenticated = state.auth.is_enabled();
    if !authenticated {
        warn!("API key not set. Requests will be served without authentication.");
    }

    audit::log_audit(&audit::AuditEvent::SystemStartup {
        component: "Agent".into(),
        authenticated,
    });

    server::run_server(&config, state).await?;

    audit::log_audit(&audit::AuditEvent::SystemShutdown {
        reason: "Signal received".into(),
    });

    info!("WordPress Agent Shutdown Complete.");
    Ok(())
}
