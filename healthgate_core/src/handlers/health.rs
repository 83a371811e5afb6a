//! Health endpoint handler

use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use tracing::warn;

/// Runs every registered check and answers with the configured status code
/// and a JSON array of `{name, pass}` in registration order.
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.health_checker.check_all().await;

    if !report.is_healthy() {
        let failing: Vec<&str> = report
            .checks
            .iter()
            .filter(|check| !check.pass)
            .map(|check| check.name.as_str())
            .collect();
        warn!(status = report.status, ?failing, "Health check failing");
    }

    (report.status_code(), Json(report.checks))
}
