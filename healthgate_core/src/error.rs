//! Application error types and handling

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Aggregate health outcome delivered through the notification sink.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthError {
    #[error("healthcheck failed")]
    CheckFailed,
}

/// Startup and wiring failures: route registration, check construction and
/// serving.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
