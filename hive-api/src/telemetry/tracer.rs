//! Tracing Subscriber Initialization
//!
//! One global `tracing-subscriber` registry: an [`EnvFilter`] (overridable
//! through `RUST_LOG`) and a JSON or human-readable `fmt` layer.

use std::str::FromStr;

use hive_core::ConfigError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "hive_api=debug,hive_events=debug,tower_http=info,info";

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::InvalidValue {
                field: "HIVE_LOG_FORMAT".to_string(),
                value: other.to_string(),
                reason: "expected json or pretty".to_string(),
            }),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_format: LogFormat,
    /// Service name attached to the startup log line
    pub service_name: String,
    pub service_version: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            service_name: "hive".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("HIVE_LOG_FORMAT") {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => LogFormat::default(),
        };
        Ok(Self {
            log_format,
            ..Self::default()
        })
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup, before anything logs. A second call fails.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_json() -> Result<(), ConfigError> {
        let config = TelemetryConfig::from_lookup(|_| None)?;
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.service_name, "hive");
        Ok(())
    }

    #[test]
    fn test_pretty_format() -> Result<(), ConfigError> {
        let config = TelemetryConfig::from_lookup(|key| {
            (key == "HIVE_LOG_FORMAT").then(|| "Pretty".to_string())
        })?;
        assert_eq!(config.log_format, LogFormat::Pretty);
        Ok(())
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
