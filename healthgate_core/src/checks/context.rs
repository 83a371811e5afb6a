//! Check that fails once a cancellation token fires.

use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::health::Check;

/// Passes until its token is cancelled, then fails for good.
///
/// A background task waits on the token and latches a flag, so the change
/// becomes visible to `pass` one scheduling step after `cancel()`.
/// Must be constructed inside a Tokio runtime.
#[derive(Debug)]
pub struct ContextCheck {
    name: String,
    terminated: Arc<AtomicBool>,
}

impl ContextCheck {
    /// Named after the calling source location.
    #[track_caller]
    pub fn new(token: CancellationToken) -> Self {
        Self::from_source(Some(token), &[])
    }

    pub fn named(token: CancellationToken, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::from_source(Some(token), &[name.as_str()])
    }

    /// Accepts zero or one name.
    ///
    /// # Panics
    ///
    /// If `source` is `None` or more than one name is given.
    #[track_caller]
    pub fn from_source(source: Option<CancellationToken>, names: &[&str]) -> Self {
        if names.len() > 1 {
            panic!("context check accepts at most one name, got {}", names.len());
        }
        let Some(token) = source else {
            panic!("context check needs a cancellation token");
        };

        let name = match names.first() {
            Some(name) => (*name).to_string(),
            None => {
                let caller = Location::caller();
                format!("{}:{}", caller.file(), caller.line())
            }
        };

        let terminated = Arc::new(AtomicBool::new(false));
        let latch = Arc::clone(&terminated);
        tokio::spawn(async move {
            token.cancelled().await;
            latch.store(true, Ordering::Release);
        });

        Self { name, terminated }
    }
}

#[async_trait::async_trait]
impl Check for ContextCheck {
    async fn pass(&self) -> bool {
        !self.terminated.load(Ordering::Acquire)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
