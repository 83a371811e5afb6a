//! Core library: check contract, aggregation engine, leaf adapters and the
//! health route for the healthgate server.

pub mod checks;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;

pub use checks::{
    build_checks, ContextCheck, EnvCheck, InfluxCheck, PingCheck, RedisCheck, SqlCheck,
};
pub use config::{AppConfig, DeliveryMode, HealthConfig};
pub use error::{AppError, HealthError, Result};
pub use handlers::routes::create_routes;
pub use health::{
    evaluate, Check, CheckStatus, FailureNotifier, HealthChecker, HealthReport, Notification,
    NotificationSink,
};

use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub health_checker: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(health_checker: Arc<HealthChecker>) -> Self {
        Self {
            app_name: "healthgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            health_checker,
        }
    }
}

/// Health route at the checker's configured path and method, with request
/// logging.
pub fn create_app(state: AppState) -> Result<Router> {
    let router = create_routes(state.health_checker.config())?.with_state(state);
    Ok(middleware::logging::with_request_logging(router))
}

/// Serves `app` until SIGINT/SIGTERM. On the signal `shutdown` is cancelled
/// first, then the listener stays open for `drain` so probes can observe the
/// failing health before connections close.
pub async fn run_server(
    app: Router,
    addr: SocketAddr,
    shutdown: CancellationToken,
    drain: Duration,
) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
            if !drain.is_zero() {
                info!(drain_secs = drain.as_secs(), "Draining before shutdown");
                tokio::time::sleep(drain).await;
            }
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
