//! InfluxDB v2 check via the server's `/ping` endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use super::sql::DEFAULT_PROBE_TIMEOUT;
use crate::health::Check;

/// Passes when `GET <url>/ping` answers `204 No Content`, which is how an
/// InfluxDB server reports that it is ready.
#[derive(Debug, Clone)]
pub struct InfluxCheck {
    url: Option<String>,
    timeout: Duration,
    name: String,
    client: Client,
}

impl InfluxCheck {
    /// A zero `timeout` means 500ms. Without a `url` every probe fails.
    pub fn new(url: Option<String>, timeout: Duration) -> Self {
        Self {
            url: url.map(|url| url.trim_end_matches('/').to_string()),
            timeout: if timeout.is_zero() {
                DEFAULT_PROBE_TIMEOUT
            } else {
                timeout
            },
            name: "influxdb".to_string(),
            client: Client::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
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
impl Check for InfluxCheck {
    async fn pass(&self) -> bool {
        let Some(url) = &self.url else {
            return false;
        };

        let request = self
            .client
            .get(format!("{}/ping", url))
            .timeout(self.timeout);

        match request.send().await {
            Ok(response) => response.status() == StatusCode::NO_CONTENT,
            Err(err) => {
                debug!(check = %self.name, error = %err, "influxdb ping failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
