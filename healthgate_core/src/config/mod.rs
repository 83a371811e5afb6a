pub mod settings;

pub use settings::{
    AppConfig, ChecksConfig, DeliveryMode, EnvTarget, FailureNotificationConfig, HealthConfig,
    PingTarget, ProbeTarget, ServerConfig,
};
