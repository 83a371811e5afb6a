//! Generic HTTP ping check.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Method};
use tracing::debug;

use crate::health::Check;

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(500);

/// Sends one request per probe and passes on any 2xx response.
#[derive(Debug, Clone)]
pub struct PingCheck {
    url: String,
    method: Option<Method>,
    timeout: Duration,
    body: Option<String>,
    headers: Option<HashMap<String, String>>,
    name: String,
    client: Client,
}

impl PingCheck {
    /// An empty `method` means GET and a zero `timeout` means 500ms. A method
    /// that is not a valid HTTP token makes every probe fail.
    pub fn new(
        url: impl Into<String>,
        method: &str,
        timeout: Duration,
        body: Option<String>,
        headers: Option<HashMap<String, String>>,
    ) -> Self {
        let url = url.into();
        let method = if method.is_empty() {
            Some(Method::GET)
        } else {
            Method::from_bytes(method.as_bytes()).ok()
        };
        let timeout = if timeout.is_zero() {
            DEFAULT_PING_TIMEOUT
        } else {
            timeout
        };

        Self {
            name: format!("ping-{}", url),
            url,
            method,
            timeout,
            body,
            headers,
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

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> Option<&HashMap<String, String>> {
        self.headers.as_ref()
    }
}

#[async_trait::async_trait]
impl Check for PingCheck {
    async fn pass(&self) -> bool {
        let Some(method) = &self.method else {
            debug!(check = %self.name, "ping skipped: invalid method");
            return false;
        };

        let mut request = self
            .client
            .request(method.clone(), &self.url)
            .timeout(self.timeout);

        if let Some(headers) = &self.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    debug!(check = %self.name, status = status.as_u16(), "ping returned non-success status");
                }
                status.is_success()
            }
            Err(err) => {
                debug!(check = %self.name, error = %err, "ping failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
