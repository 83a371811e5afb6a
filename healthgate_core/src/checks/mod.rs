//! Leaf check adapters and construction from configuration

pub mod context;
pub mod env;
pub mod influx;
pub mod ping;
pub mod redis;
pub mod sql;

pub use context::ContextCheck;
pub use env::EnvCheck;
pub use influx::InfluxCheck;
pub use ping::PingCheck;
pub use self::redis::RedisCheck;
pub use sql::SqlCheck;

use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::config::ChecksConfig;
use crate::error::{AppError, Result};
use crate::health::Check;

/// Builds the checks described in configuration, in the order ping, env,
/// database, redis, influx. Connections are opened lazily so an unavailable
/// dependency shows up as a failing check rather than a startup error.
pub fn build_checks(config: &ChecksConfig) -> Result<Vec<Arc<dyn Check>>> {
    let mut checks: Vec<Arc<dyn Check>> = Vec::new();

    for target in &config.ping {
        let mut check = PingCheck::new(
            target.url.clone(),
            &target.method,
            Duration::from_millis(target.timeout_ms),
            target.body.clone(),
            target.headers.clone(),
        );
        if let Some(title) = &target.title {
            check = check.with_title(title.clone());
        }
        checks.push(Arc::new(check));
    }

    for target in &config.env {
        let mut check = EnvCheck::new(target.variable.clone())
            .with_pattern(target.pattern.as_deref().unwrap_or_default())
            .map_err(|e| AppError::Config(format!("env check {}: {}", target.variable, e)))?;
        if let Some(title) = &target.title {
            check = check.with_title(title.clone());
        }
        checks.push(Arc::new(check));
    }

    if let Some(target) = &config.database {
        let pool = SqlitePoolOptions::new().connect_lazy(&target.url)?;
        let mut check = SqlCheck::new(Some(pool), Duration::from_millis(target.timeout_ms));
        if let Some(title) = &target.title {
            check = check.with_title(title.clone());
        }
        checks.push(Arc::new(check));
    }

    if let Some(target) = &config.redis {
        let client = ::redis::Client::open(target.url.as_str())
            .map_err(|e| AppError::Config(format!("redis url: {}", e)))?;
        let mut check = RedisCheck::new(Some(client), Duration::from_millis(target.timeout_ms));
        if let Some(title) = &target.title {
            check = check.with_title(title.clone());
        }
        checks.push(Arc::new(check));
    }

    if let Some(target) = &config.influx {
        let mut check = InfluxCheck::new(
            Some(target.url.clone()),
            Duration::from_millis(target.timeout_ms),
        );
        if let Some(title) = &target.title {
            check = check.with_title(title.clone());
        }
        checks.push(Arc::new(check));
    }

    info!(count = checks.len(), "Health checks configured");
    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvTarget, PingTarget, ProbeTarget};

    #[tokio::test]
    async fn test_build_checks_in_order() {
        let config = ChecksConfig {
            ping: vec![PingTarget {
                url: "http://localhost:9000".to_string(),
                ..Default::default()
            }],
            env: vec![EnvTarget {
                variable: "PATH".to_string(),
                pattern: None,
                title: Some("path-set".to_string()),
            }],
            database: Some(ProbeTarget {
                url: "sqlite::memory:".to_string(),
                timeout_ms: 0,
                title: None,
            }),
            redis: Some(ProbeTarget {
                url: "redis://127.0.0.1:6379/".to_string(),
                timeout_ms: 100,
                title: Some("cache".to_string()),
            }),
            influx: Some(ProbeTarget {
                url: "http://localhost:8086".to_string(),
                timeout_ms: 0,
                title: None,
            }),
        };

        let checks = build_checks(&config).unwrap();
        let names: Vec<_> = checks.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec![
                "ping-http://localhost:9000",
                "path-set",
                "sqlite",
                "cache",
                "influxdb"
            ]);
    }

    #[tokio::test]
    async fn test_build_checks_rejects_bad_pattern() {
        let config = ChecksConfig {
            env: vec![EnvTarget {
                variable: "PATH".to_string(),
                pattern: Some("(".to_string()),
                title: None,
            }],
            ..Default::default()
        };

        assert!(matches!(build_checks(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_build_no_checks() {
        assert!(build_checks(&ChecksConfig::default()).unwrap().is_empty());
    }
}
