//! Concurrent fan-out of registered checks into one aggregate outcome

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::checks::{Check, CheckStatus, HealthReport};
use super::notifier::FailureNotifier;
use crate::config::HealthConfig;

/// Runs every check on its own task and returns the aggregate status code
/// with per-check results in input order.
///
/// A check that panics is reported as failing without affecting the other
/// slots. No deadline is applied here, so one check that never returns
/// keeps the whole call pending. The notifier is updated before returning.
///
/// The fan-out, join and notifier update run together on a spawned task.
/// Dropping this future (a probe client that gave up) still lets the
/// aggregate outcome count towards the failure streak.
pub async fn evaluate(
    checks: &[Arc<dyn Check>],
    config: &HealthConfig,
    notifier: &FailureNotifier,
) -> (u16, Vec<CheckStatus>) {
    let names: Vec<String> = checks.iter().map(|check| check.name().to_string()).collect();
    let task = tokio::spawn(run_checks(
        checks.to_vec(),
        config.status_ok,
        config.status_not_ok,
        notifier.clone(),
    ));

    match task.await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(error = %err, "health evaluation task did not complete");
            let statuses = names
                .into_iter()
                .map(|name| CheckStatus::new(name, false))
                .collect();
            (config.status_not_ok, statuses)
        }
    }
}

async fn run_checks(
    checks: Vec<Arc<dyn Check>>,
    status_ok: u16,
    status_not_ok: u16,
    notifier: FailureNotifier,
) -> (u16, Vec<CheckStatus>) {
    let handles: Vec<_> = checks
        .iter()
        .map(|check| {
            let check = Arc::clone(check);
            tokio::spawn(async move { check.pass().await })
        })
        .collect();

    let outcomes = join_all(handles).await;

    let statuses: Vec<CheckStatus> = checks
        .iter()
        .zip(outcomes)
        .map(|(check, outcome)| {
            let pass = match outcome {
                Ok(pass) => pass,
                Err(err) => {
                    warn!(check = check.name(), error = %err, "check task did not complete");
                    false
                }
            };
            CheckStatus::new(check.name(), pass)
        })
        .collect();

    let healthy = statuses.iter().all(|status| status.pass);
    notifier.record(healthy).await;

    let status = if healthy { status_ok } else { status_not_ok };

    debug!(
        checks = statuses.len(),
        failing = statuses.iter().filter(|s| !s.pass).count(),
        status,
        "health evaluation finished"
    );

    (status, statuses)
}

/// Checks registered for one health endpoint, with that endpoint's config
/// and failure-streak state.
pub struct HealthChecker {
    checks: Vec<Arc<dyn Check>>,
    config: HealthConfig,
    notifier: FailureNotifier,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        let notifier = FailureNotifier::from_config(&config.failure_notification);
        Self {
            checks: Vec::new(),
            config,
            notifier,
        }
    }

    pub fn add_check<T: Check + 'static>(mut self, check: T) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn add_shared_check(mut self, check: Arc<dyn Check>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_checks(mut self, checks: impl IntoIterator<Item = Arc<dyn Check>>) -> Self {
        self.checks.extend(checks);
        self
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    pub fn notifier(&self) -> &FailureNotifier {
        &self.notifier
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub async fn check_all(&self) -> HealthReport {
        let (status, checks) = evaluate(&self.checks, &self.config, &self.notifier).await;
        HealthReport { status, checks }
    }
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("checks", &self.check_names())
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .finish()
    }
}
