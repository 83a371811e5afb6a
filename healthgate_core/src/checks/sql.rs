//! SQL database check over any sqlx pool.

use std::time::Duration;

use sqlx::{Connection, Database, Pool};
use tokio::time::timeout;
use tracing::debug;

use crate::health::Check;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Acquires a pooled connection and pings it. Named after the driver
/// (`mysql`, `sqlite`, `postgresql`) unless given a title.
pub struct SqlCheck<DB: Database> {
    pool: Option<Pool<DB>>,
    timeout: Duration,
    name: String,
}

impl<DB: Database> SqlCheck<DB> {
    /// A zero `timeout` means 500ms.
    pub fn new(pool: Option<Pool<DB>>, timeout: Duration) -> Self {
        Self {
            pool,
            timeout: if timeout.is_zero() {
                DEFAULT_PROBE_TIMEOUT
            } else {
                timeout
            },
            name: DB::NAME.to_lowercase(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.name = title.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl<DB: Database> Check for SqlCheck<DB> {
    async fn pass(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        if pool.is_closed() {
            return false;
        }

        let probe = async {
            let mut conn = pool.acquire().await?;
            conn.ping().await
        };

        match timeout(self.timeout, probe).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                debug!(check = %self.name, error = %err, "database ping failed");
                false
            }
            Err(_) => {
                debug!(check = %self.name, timeout_ms = self.timeout.as_millis() as u64, "database ping timed out");
                false
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
