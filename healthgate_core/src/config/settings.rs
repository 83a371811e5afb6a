use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::health::NotificationSink;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds the listener stays open after a shutdown signal.
    pub shutdown_drain_seconds: u64,
}

/// Settings for one health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub health_path: String,
    pub method: String,
    pub status_ok: u16,
    pub status_not_ok: u16,
    pub failure_notification: FailureNotificationConfig,
}

/// How the notifier hands events to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Drop the event when the queue is full.
    #[default]
    TrySend,
    /// Wait for queue space, stalling health requests meanwhile.
    Blocking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureNotificationConfig {
    /// Consecutive aggregate failures before the first notification.
    pub threshold: u32,
    pub delivery: DeliveryMode,
    /// Capacity of the queue the server creates for the sink.
    pub buffer_size: usize,
    #[serde(skip)]
    pub sink: Option<NotificationSink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default)]
    pub ping: Vec<PingTarget>,
    #[serde(default)]
    pub env: Vec<EnvTarget>,
    #[serde(default)]
    pub database: Option<ProbeTarget>,
    #[serde(default)]
    pub redis: Option<ProbeTarget>,
    #[serde(default)]
    pub influx: Option<ProbeTarget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingTarget {
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvTarget {
    pub variable: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Connection URL plus probe timeout for a database or cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeTarget {
    pub url: String,
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub title: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            health: HealthConfig::default(),
            checks: ChecksConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            shutdown_drain_seconds: 5,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            health_path: "/healthz".to_string(),
            method: "GET".to_string(),
            status_ok: 200,
            status_not_ok: 503,
            failure_notification: FailureNotificationConfig::default(),
        }
    }
}

impl Default for FailureNotificationConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            delivery: DeliveryMode::TrySend,
            buffer_size: 16,
            sink: None,
        }
    }
}

impl HealthConfig {
    pub fn with_sink(mut self, sink: NotificationSink) -> Self {
        self.failure_notification.sink = Some(sink);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.health_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "Health path must start with '/': {:?}",
                self.health_path
            )));
        }

        if http::Method::from_bytes(self.method.as_bytes()).is_err() {
            return Err(ConfigError::Message(format!(
                "Invalid health method: {:?}",
                self.method
            )));
        }

        for code in [self.status_ok, self.status_not_ok] {
            if http::StatusCode::from_u16(code).is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid HTTP status code: {}",
                    code
                )));
            }
        }

        if self.failure_notification.threshold == 0 {
            return Err(ConfigError::Message(
                "Failure notification threshold must be greater than 0".to_string(),
            ));
        }

        if self.failure_notification.buffer_size == 0 {
            return Err(ConfigError::Message(
                "Failure notification buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("healthgate.toml")
    }

    /// Defaults, then `path` if it exists, then `HEALTHGATE_*` variables
    /// (`HEALTHGATE_SERVER__PORT=8080`).
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("HEALTHGATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        self.health.validate()?;

        for target in &self.checks.ping {
            if target.url.is_empty() {
                return Err(ConfigError::Message(
                    "Ping check URL cannot be empty".to_string(),
                ));
            }
        }

        for target in &self.checks.env {
            if target.variable.is_empty() {
                return Err(ConfigError::Message(
                    "Env check variable cannot be empty".to_string(),
                ));
            }
            if let Some(pattern) = &target.pattern {
                regex::Regex::new(pattern).map_err(|e| {
                    ConfigError::Message(format!(
                        "Invalid pattern for {}: {}",
                        target.variable, e
                    ))
                })?;
            }
        }

        for target in [&self.checks.database, &self.checks.redis, &self.checks.influx]
            .into_iter()
            .flatten()
        {
            if target.url.is_empty() {
                return Err(ConfigError::Message(
                    "Probe target URL cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
