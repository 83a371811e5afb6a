//! Edge-triggered failure-streak notifications.
//!
//! The notifier counts consecutive aggregate failures and emits one
//! `Notification::Unhealthy` when the streak first reaches the threshold,
//! then one `Notification::Recovered` on the next aggregate success. Nothing
//! is emitted while the outcome stays the same.
//!
//! ```text
//! Healthy ──fail──▶ Failing(k) ──fail, k+1 == threshold──▶ NotifiedFailing
//!    ▲                  │                                        │
//!    └────success───────┘◀───────────success (Recovered)─────────┘
//! ```
//!
//! Each health endpoint owns its own notifier, so two endpoints in one
//! process never share a streak. Clones of a notifier share it.
//!
//! `record` runs the counter update and delivery on a spawned task, so a
//! caller that gives up early (a dropped request future) cannot leave a
//! streak marked as announced without its event having been sent.

use crate::config::{DeliveryMode, FailureNotificationConfig};
use crate::error::HealthError;
use tokio::sync::mpsc::{self, error::TrySendError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Queue receiving notifications. Creating and closing it is up to the
/// embedding application.
pub type NotificationSink = mpsc::Sender<Notification>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The failure streak reached the threshold.
    Unhealthy(HealthError),
    /// First success after an announced failure streak.
    Recovered,
}

impl Notification {
    pub fn error(&self) -> Option<HealthError> {
        match self {
            Notification::Unhealthy(err) => Some(*err),
            Notification::Recovered => None,
        }
    }
}

#[derive(Debug, Default)]
struct Streak {
    failures: u32,
    notified: bool,
}

impl Streak {
    fn advance(&mut self, healthy: bool, threshold: u32) -> Option<Notification> {
        if healthy {
            let recovered = self.notified;
            self.failures = 0;
            self.notified = false;
            return recovered.then_some(Notification::Recovered);
        }

        self.failures = self.failures.saturating_add(1);
        if !self.notified && self.failures >= threshold {
            self.notified = true;
            Some(Notification::Unhealthy(HealthError::CheckFailed))
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct FailureNotifier {
    threshold: u32,
    delivery: DeliveryMode,
    sink: Option<NotificationSink>,
    streak: Arc<Mutex<Streak>>,
}

impl FailureNotifier {
    /// A threshold of 0 behaves like 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            delivery: DeliveryMode::default(),
            sink: None,
            streak: Arc::new(Mutex::new(Streak::default())),
        }
    }

    pub fn from_config(config: &FailureNotificationConfig) -> Self {
        let notifier = Self::new(config.threshold).with_delivery(config.delivery);
        match &config.sink {
            Some(sink) => notifier.with_sink(sink.clone()),
            None => notifier,
        }
    }

    pub fn with_sink(mut self, sink: NotificationSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Current number of consecutive aggregate failures.
    pub async fn streak(&self) -> u32 {
        self.streak.lock().await.failures
    }

    /// Records one aggregate outcome and returns the transition it caused.
    ///
    /// The lock is held until delivery finishes, so concurrent callers are
    /// serialized on counter update and send alike. With
    /// `DeliveryMode::Blocking` a full queue stalls every caller until a
    /// consumer drains it. Dropping the returned future does not abandon the
    /// update: it completes on its own task.
    pub async fn record(&self, healthy: bool) -> Option<Notification> {
        let notifier = self.clone();
        match tokio::spawn(async move { notifier.advance_and_deliver(healthy).await }).await {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "failure notification task did not complete");
                None
            }
        }
    }

    async fn advance_and_deliver(&self, healthy: bool) -> Option<Notification> {
        let mut streak = self.streak.lock().await;
        let event = streak.advance(healthy, self.threshold);

        if let Some(notification) = event {
            debug!(
                ?notification,
                streak = streak.failures,
                threshold = self.threshold,
                "failure streak transition"
            );
            self.deliver(notification).await;
        }

        event
    }

    async fn deliver(&self, notification: Notification) {
        let Some(sink) = &self.sink else {
            return;
        };

        match self.delivery {
            DeliveryMode::Blocking => {
                if sink.send(notification).await.is_err() {
                    warn!(?notification, "notification sink closed, event dropped");
                }
            }
            DeliveryMode::TrySend => match sink.try_send(notification) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(?notification, "notification sink full, event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(?notification, "notification sink closed, event dropped");
                }
            },
        }
    }
}

impl std::fmt::Debug for FailureNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureNotifier")
            .field("threshold", &self.threshold)
            .field("delivery", &self.delivery)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
