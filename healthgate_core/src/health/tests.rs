use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::config::HealthConfig;
use crate::error::HealthError;
use crate::health::{
    evaluate, Check, CheckStatus, FailureNotifier, HealthChecker, HealthReport, Notification,
};

struct StaticCheck {
    name: &'static str,
    pass: bool,
}

#[async_trait::async_trait]
impl Check for StaticCheck {
    async fn pass(&self) -> bool {
        self.pass
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct SlowCheck {
    name: &'static str,
    delay: Duration,
}

#[async_trait::async_trait]
impl Check for SlowCheck {
    async fn pass(&self) -> bool {
        tokio::time::sleep(self.delay).await;
        true
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct SlowFailingCheck {
    delay: Duration,
}

#[async_trait::async_trait]
impl Check for SlowFailingCheck {
    async fn pass(&self) -> bool {
        tokio::time::sleep(self.delay).await;
        false
    }

    fn name(&self) -> &str {
        "Slow Failing Check"
    }
}

struct PanickingCheck;

#[async_trait::async_trait]
impl Check for PanickingCheck {
    async fn pass(&self) -> bool {
        panic!("probe blew up");
    }

    fn name(&self) -> &str {
        "Panicking Check"
    }
}

#[derive(Default)]
struct ControlledCheck {
    will_pass: AtomicBool,
    calls: AtomicUsize,
}

impl ControlledCheck {
    fn passing() -> Arc<Self> {
        let check = Self::default();
        check.set(true);
        Arc::new(check)
    }

    fn set(&self, pass: bool) {
        self.will_pass.store(pass, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Check for ControlledCheck {
    async fn pass(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.will_pass.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "Controlled Check"
    }
}

fn shared<T: Check + 'static>(check: T) -> Arc<dyn Check> {
    Arc::new(check)
}

#[tokio::test]
async fn test_empty_checks_pass() {
    let config = HealthConfig::default();
    let notifier = FailureNotifier::new(1);

    let (status, results) = evaluate(&[], &config, &notifier).await;
    assert_eq!(status, 200);
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_all_passing_keeps_order() {
    let config = HealthConfig::default();
    let notifier = FailureNotifier::new(1);
    let checks = vec![
        shared(StaticCheck { name: "first", pass: true }),
        shared(StaticCheck { name: "second", pass: true }),
        shared(StaticCheck { name: "third", pass: true }),
    ];

    let (status, results) = evaluate(&checks, &config, &notifier).await;
    assert_eq!(status, 200);
    assert_eq!(
        results,
        vec![
            CheckStatus::new("first", true),
            CheckStatus::new("second", true),
            CheckStatus::new("third", true),
        ]
    );
}

#[tokio::test]
async fn test_one_failure_fails_aggregate() {
    let config = HealthConfig::default();
    let notifier = FailureNotifier::new(1);
    let checks = vec![
        shared(StaticCheck { name: "mysql", pass: true }),
        shared(StaticCheck { name: "Failing Check", pass: false }),
    ];

    let (status, results) = evaluate(&checks, &config, &notifier).await;
    assert_eq!(status, 503);
    assert_eq!(
        results,
        vec![
            CheckStatus::new("mysql", true),
            CheckStatus::new("Failing Check", false),
        ]
    );
}

#[tokio::test]
async fn test_custom_status_codes() {
    let mut config = HealthConfig::default();
    config.status_ok = 204;
    config.status_not_ok = 500;
    let notifier = FailureNotifier::new(1);

    let passing = vec![shared(StaticCheck { name: "ok", pass: true })];
    assert_eq!(evaluate(&passing, &config, &notifier).await.0, 204);

    let failing = vec![shared(StaticCheck { name: "down", pass: false })];
    assert_eq!(evaluate(&failing, &config, &notifier).await.0, 500);
}

#[tokio::test]
async fn test_results_follow_input_not_completion_order() {
    let config = HealthConfig::default();
    let notifier = FailureNotifier::new(1);
    let checks = vec![
        shared(SlowCheck { name: "slowest", delay: Duration::from_millis(150) }),
        shared(SlowCheck { name: "fast", delay: Duration::from_millis(1) }),
        shared(SlowCheck { name: "medium", delay: Duration::from_millis(50) }),
    ];

    let (_, results) = evaluate(&checks, &config, &notifier).await;
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["slowest", "fast", "medium"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_checks_run_in_parallel() {
    let config = HealthConfig::default();
    let notifier = FailureNotifier::new(1);
    let checks = vec![
        shared(SlowCheck { name: "Slow Check", delay: Duration::from_secs(2) }),
        shared(SlowCheck { name: "Slow Check", delay: Duration::from_secs(2) }),
    ];

    let start = Instant::now();
    let (status, _) = evaluate(&checks, &config, &notifier).await;
    assert_eq!(status, 200);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_panicking_check_is_isolated() {
    let config = HealthConfig::default();
    let notifier = FailureNotifier::new(1);
    let checks = vec![
        shared(StaticCheck { name: "before", pass: true }),
        shared(PanickingCheck),
        shared(StaticCheck { name: "after", pass: true }),
    ];

    let (status, results) = evaluate(&checks, &config, &notifier).await;
    assert_eq!(status, 503);
    assert_eq!(
        results,
        vec![
            CheckStatus::new("before", true),
            CheckStatus::new("Panicking Check", false),
            CheckStatus::new("after", true),
        ]
    );
}

#[tokio::test]
async fn test_passing_evaluation_is_idempotent() {
    let checker = HealthChecker::new(HealthConfig::default())
        .add_check(StaticCheck { name: "a", pass: true })
        .add_check(StaticCheck { name: "b", pass: true });

    let first = checker.check_all().await;
    let second = checker.check_all().await;
    assert_eq!(first, second);
    assert!(first.is_healthy());
    assert_eq!(checker.notifier().streak().await, 0);
}

#[tokio::test]
async fn test_switch_result_between_calls() {
    let controlled = ControlledCheck::passing();
    let checker = HealthChecker::new(HealthConfig::default()).add_shared_check(controlled.clone());

    let report = checker.check_all().await;
    assert_eq!(report.status, 200);
    assert_eq!(report.checks, vec![CheckStatus::new("Controlled Check", true)]);

    controlled.set(false);
    let report = checker.check_all().await;
    assert_eq!(report.status, 503);
    assert_eq!(report.checks, vec![CheckStatus::new("Controlled Check", false)]);
    assert_eq!(controlled.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_notification_edge_triggering() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut config = HealthConfig::default().with_sink(tx);
    config.failure_notification.threshold = 3;

    let controlled = ControlledCheck::passing();
    let checker = HealthChecker::new(config).add_shared_check(controlled.clone());

    assert_eq!(checker.check_all().await.status, 200);
    assert!(rx.try_recv().is_err());

    controlled.set(false);
    checker.check_all().await;
    checker.check_all().await;
    assert!(rx.try_recv().is_err(), "no event before the threshold");

    checker.check_all().await;
    assert_eq!(
        rx.try_recv().ok(),
        Some(Notification::Unhealthy(HealthError::CheckFailed))
    );

    checker.check_all().await;
    assert!(rx.try_recv().is_err(), "suppressed while already notified");
    assert_eq!(checker.notifier().streak().await, 4);

    controlled.set(true);
    assert_eq!(checker.check_all().await.status, 200);
    assert_eq!(rx.try_recv().ok(), Some(Notification::Recovered));

    checker.check_all().await;
    assert!(rx.try_recv().is_err(), "no event on steady success");

    // a fresh streak announces again
    controlled.set(false);
    for _ in 0..3 {
        checker.check_all().await;
    }
    assert_eq!(
        rx.try_recv().ok().and_then(|n| n.error()),
        Some(HealthError::CheckFailed)
    );
}

#[tokio::test]
async fn test_separate_checkers_keep_separate_streaks() {
    let mut config = HealthConfig::default();
    config.failure_notification.threshold = 2;

    let failing = HealthChecker::new(config.clone())
        .add_check(StaticCheck { name: "down", pass: false });
    let passing = HealthChecker::new(config)
        .add_check(StaticCheck { name: "up", pass: true });

    failing.check_all().await;
    passing.check_all().await;
    failing.check_all().await;

    assert_eq!(failing.notifier().streak().await, 2);
    assert_eq!(passing.notifier().streak().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_count_every_failure() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut config = HealthConfig::default().with_sink(tx);
    config.failure_notification.threshold = 5;

    let checker = Arc::new(
        HealthChecker::new(config).add_check(StaticCheck { name: "down", pass: false }),
    );

    let calls: Vec<_> = (0..20)
        .map(|_| {
            let checker = checker.clone();
            tokio::spawn(async move { checker.check_all().await })
        })
        .collect();
    for call in calls {
        let report = call.await.unwrap();
        assert_eq!(report.checks, vec![CheckStatus::new("down", false)]);
    }

    assert_eq!(checker.notifier().streak().await, 20);
    assert_eq!(
        rx.try_recv().ok(),
        Some(Notification::Unhealthy(HealthError::CheckFailed))
    );
    assert!(rx.try_recv().is_err(), "exactly one event for the whole streak");
}

#[tokio::test]
async fn test_abandoned_evaluations_still_count() {
    let (tx, mut rx) = mpsc::channel(4);
    let mut config = HealthConfig::default().with_sink(tx);
    config.failure_notification.threshold = 3;

    let checker = HealthChecker::new(config).add_check(SlowFailingCheck {
        delay: Duration::from_millis(200),
    });

    for _ in 0..3 {
        let gave_up = tokio::time::timeout(Duration::from_millis(50), checker.check_all()).await;
        assert!(gave_up.is_err());
    }

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(checker.notifier().streak().await, 3);
    assert_eq!(
        rx.try_recv().ok(),
        Some(Notification::Unhealthy(HealthError::CheckFailed))
    );
}

#[test]
fn test_check_status_serialization() {
    let statuses = vec![CheckStatus::new("mysql", true), CheckStatus::new("", false)];
    let json = serde_json::to_string(&statuses).unwrap();
    assert_eq!(json, r#"[{"name":"mysql","pass":true},{"name":"","pass":false}]"#);
}

#[test]
fn test_checker_reports_registered_names() {
    let checker = HealthChecker::new(HealthConfig::default())
        .add_check(StaticCheck { name: "redis", pass: true })
        .add_check(StaticCheck { name: "mysql", pass: true });

    assert_eq!(checker.len(), 2);
    assert!(!checker.is_empty());
    assert_eq!(checker.check_names(), vec!["redis", "mysql"]);
}

#[test]
fn test_report_status_code_fallback() {
    let report = HealthReport {
        status: 204,
        checks: vec![CheckStatus::new("mysql", true)],
    };
    assert_eq!(report.status_code(), axum::http::StatusCode::NO_CONTENT);

    let report = HealthReport {
        status: 42,
        checks: vec![CheckStatus::new("mysql", false)],
    };
    assert!(!report.is_healthy());
    assert_eq!(report.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let report = HealthReport { status: 1000, checks: Vec::new() };
    assert_eq!(report.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
}
