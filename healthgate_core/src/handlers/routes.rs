//! Route registration for the health endpoint

use crate::{
    config::HealthConfig,
    error::{AppError, Result},
    handlers::health::handle_health,
    AppState,
};
use axum::{
    http::Method,
    routing::{on, MethodFilter},
    Router,
};
use tracing::info;

/// Registers the health handler at the configured path and method.
///
/// Fails with `AppError::Config` when the method is not a valid HTTP token
/// or has no axum routing filter (extension methods such as `PURGE`).
pub fn create_routes(config: &HealthConfig) -> Result<Router<AppState>> {
    let method = Method::from_bytes(config.method.as_bytes())
        .map_err(|_| AppError::Config(format!("invalid health method: {:?}", config.method)))?;
    let filter = MethodFilter::try_from(method.clone())
        .map_err(|e| AppError::Config(format!("unsupported health method {}: {}", method, e)))?;

    info!(method = %method, path = %config.health_path, "Registering health route");

    Ok(Router::new().route(&config.health_path, on(filter, handle_health)))
}
