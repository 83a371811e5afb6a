//! Redis check via `PING`.

use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use super::sql::DEFAULT_PROBE_TIMEOUT;
use crate::health::Check;

#[derive(Debug, Clone)]
pub struct RedisCheck {
    client: Option<redis::Client>,
    timeout: Duration,
    name: String,
}

impl RedisCheck {
    /// A zero `timeout` means 500ms.
    pub fn new(client: Option<redis::Client>, timeout: Duration) -> Self {
        Self {
            client,
            timeout: if timeout.is_zero() {
                DEFAULT_PROBE_TIMEOUT
            } else {
                timeout
            },
            name: "redis".to_string(),
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
impl Check for RedisCheck {
    async fn pass(&self) -> bool {
        let Some(client) = &self.client else {
            return false;
        };

        let probe = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, redis::RedisError>(pong)
        };

        match timeout(self.timeout, probe).await {
            Ok(Ok(pong)) => pong == "PONG",
            Ok(Err(err)) => {
                debug!(check = %self.name, error = %err, "redis ping failed");
                false
            }
            Err(_) => {
                debug!(check = %self.name, "redis ping timed out");
                false
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
