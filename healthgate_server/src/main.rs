//! Main entry point for the healthgate server binary

use anyhow::{Context, Result};
use healthgate_core::{
    build_checks, create_app, run_server, AppConfig, AppError, AppState, ContextCheck,
    HealthChecker, Notification,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(AppError::from)
        .context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let (sink, receiver) = mpsc::channel(config.health.failure_notification.buffer_size);
    tokio::spawn(log_notifications(receiver));

    let shutdown = CancellationToken::new();
    let checks = build_checks(&config.checks).context("Failed to build health checks")?;

    let checker = HealthChecker::new(config.health.clone().with_sink(sink))
        .add_check(ContextCheck::named(shutdown.clone(), "shutdown"))
        .with_checks(checks);

    info!(
        path = %config.health.health_path,
        method = %config.health.method,
        checks = ?checker.check_names(),
        threshold = config.health.failure_notification.threshold,
        "Health endpoint configured"
    );

    let state = AppState::new(Arc::new(checker));
    info!("App: {} v{}", state.app_name, state.version);

    let app = create_app(state)?;

    let drain = Duration::from_secs(config.server.shutdown_drain_seconds);
    run_server(app, addr, shutdown, drain).await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn log_notifications(mut receiver: mpsc::Receiver<Notification>) {
    while let Some(notification) = receiver.recv().await {
        match notification.error() {
            Some(err) => warn!(error = %err, "Health failure notification"),
            None => info!("Health recovery notification"),
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!(
                "{}={},healthgate_core={},tower_http=info",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                default_level,
                default_level
            ).into()
        });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
