//! Check contract and the result records produced by an aggregation

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// A named, independently pollable liveness probe.
///
/// Implementations own their timeout discipline: the aggregator waits for
/// `pass` to return and imposes no deadline of its own. Probe errors are
/// reported as `false`, never raised.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    async fn pass(&self) -> bool;
    fn name(&self) -> &str;
}

/// Outcome of a single check, serialized as `{"name": .., "pass": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStatus {
    pub name: String,
    pub pass: bool,
}

impl CheckStatus {
    pub fn new(name: impl Into<String>, pass: bool) -> Self {
        Self {
            name: name.into(),
            pass,
        }
    }
}

/// Status code plus per-check results, in the order the checks were registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: u16,
    pub checks: Vec<CheckStatus>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|check| check.pass)
    }

    /// Falls back to 503 if the configured code is not a valid HTTP status.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
    }
}
