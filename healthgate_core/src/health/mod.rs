pub mod aggregator;
pub mod checks;
pub mod notifier;

#[cfg(test)]
mod tests;

pub use aggregator::{evaluate, HealthChecker};
pub use checks::{Check, CheckStatus, HealthReport};
pub use notifier::{FailureNotifier, Notification, NotificationSink};
