//! Process configuration read from the environment
//!
//! - `PORT` - listen port (default 8080)
//! - `HEALTH_PATH` - health route (default `/healthz`)
//! - `LOG_FORMAT` - `json` or `text` (default `json`)

use crate::logging::LogFormat;
use std::net::SocketAddr;
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default health-check route
pub const DEFAULT_HEALTH_PATH: &str = "/healthz";

/// How long in-flight requests may run once shutdown begins
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid HEALTH_PATH {0:?}: must start with '/' and contain no pattern characters")]
    InvalidHealthPath(String),

    #[error("Unknown LOG_FORMAT {0:?}: expected 'json' or 'text'")]
    UnknownLogFormat(String),
}

/// Runtime settings for the health service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub health_path: String,
    pub log_format: LogFormat,
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            log_format: LogFormat::default(),
            shutdown_grace: SHUTDOWN_GRACE_PERIOD,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating empty values as unset
    ///
    /// Tests pass a closure over a map instead of touching process env vars,
    /// which would race between parallel tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?;
        }

        if let Some(path) = get("HEALTH_PATH") {
            if !is_valid_route(&path) {
                return Err(ConfigError::InvalidHealthPath(path));
            }
            config.health_path = path;
        }

        if let Some(format) = get("LOG_FORMAT") {
            config.log_format = format
                .parse()
                .map_err(|_| ConfigError::UnknownLogFormat(format))?;
        }

        Ok(config)
    }

    /// Address the listener binds to (all interfaces)
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// A fixed route the router accepts without treating it as a pattern
fn is_valid_route(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '*' | ':'))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
