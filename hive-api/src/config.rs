//! Server Configuration Module
//!
//! Everything the binary needs before it can serve, loaded from environment
//! variables. The root token and the port are required; every other value
//! has a default.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use hive_core::ConfigError;
use hive_events::{
    DispatcherConfig, OverflowPolicy, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_SUBSCRIBER_CAPACITY,
};
use secrecy::{ExposeSecret, SecretString};

use crate::auth::AuthConfig;

const DEFAULT_BIND: &str = "0.0.0.0";

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

#[derive(Clone)]
pub struct ServerConfig {
    /// Token granting the root principal. Never printed.
    pub root_token: SecretString,

    pub bind: String,
    pub port: u16,

    // ========================================================================
    // Live events
    // ========================================================================
    /// Bound of each subscriber's queue
    pub subscriber_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub heartbeat_interval: Duration,

    // ========================================================================
    // CORS
    // ========================================================================
    /// Allowed CORS origins. Empty means allow all.
    pub cors_origins: Vec<String>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("root_token", &"[REDACTED]")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("subscriber_capacity", &self.subscriber_capacity)
            .field("overflow_policy", &self.overflow_policy)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl ServerConfig {
    /// Create ServerConfig from environment variables.
    ///
    /// Environment variables:
    /// - `HIVE_ROOT_TOKEN`: root bearer token (required)
    /// - `HIVE_PORT`, falling back to `PORT`: listening port (required)
    /// - `HIVE_BIND`: bind host (default: 0.0.0.0)
    /// - `HIVE_SUBSCRIBER_CAPACITY`: per-subscriber queue bound (default: 64)
    /// - `HIVE_OVERFLOW_POLICY`: `drop-oldest` or `disconnect` (default: drop-oldest)
    /// - `HIVE_HEARTBEAT_SECS`: heartbeat interval (default: 30)
    /// - `HIVE_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let root_token = get("HIVE_ROOT_TOKEN").ok_or_else(|| ConfigError::MissingRequired {
            field: "HIVE_ROOT_TOKEN".to_string(),
        })?;

        let (port_var, port_raw) = get("HIVE_PORT")
            .map(|value| ("HIVE_PORT", value))
            .or_else(|| get("PORT").map(|value| ("PORT", value)))
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "HIVE_PORT".to_string(),
            })?;
        let port: u16 = parse_value(port_var, &port_raw)?;
        if port == 0 {
            return Err(invalid(port_var, &port_raw, "port must be between 1 and 65535"));
        }

        let subscriber_capacity = match get("HIVE_SUBSCRIBER_CAPACITY") {
            Some(raw) => {
                let capacity: usize = parse_value("HIVE_SUBSCRIBER_CAPACITY", &raw)?;
                if capacity == 0 {
                    return Err(invalid("HIVE_SUBSCRIBER_CAPACITY", &raw, "must be at least 1"));
                }
                capacity
            }
            None => DEFAULT_SUBSCRIBER_CAPACITY,
        };

        let overflow_policy = match get("HIVE_OVERFLOW_POLICY") {
            Some(raw) => raw
                .parse::<OverflowPolicy>()
                .map_err(|reason| invalid("HIVE_OVERFLOW_POLICY", &raw, &reason))?,
            None => OverflowPolicy::default(),
        };

        let heartbeat_interval = match get("HIVE_HEARTBEAT_SECS") {
            Some(raw) => {
                let secs: u64 = parse_value("HIVE_HEARTBEAT_SECS", &raw)?;
                if secs == 0 {
                    return Err(invalid("HIVE_HEARTBEAT_SECS", &raw, "must be at least 1"));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_HEARTBEAT_INTERVAL,
        };

        let cors_origins = get("HIVE_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            root_token: SecretString::from(root_token),
            bind: get("HIVE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
            subscriber_capacity,
            overflow_policy,
            heartbeat_interval,
            cors_origins,
        })
    }

    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.root_token.expose_secret())
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            subscriber_capacity: self.subscriber_capacity,
            overflow_policy: self.overflow_policy,
            heartbeat_interval: self.heartbeat_interval,
        }
    }
}

fn parse_value<T>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| invalid(field, raw, &e.to_string()))
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
