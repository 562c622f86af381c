//! Client configuration model.
//!
//! Loading and precedence live in `taskdeck-infrastructure`; this module only
//! defines the shape of `config.toml` and its defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "TASKDECK_API_URL";
/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "TASKDECK_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    /// Request timeout; `0` falls back to the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://tasks.example.com/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://tasks.example.com/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config: ClientConfig = toml::from_str("[api]\ntimeout_secs = 0").unwrap();
        assert_eq!(config.api.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let config: ClientConfig = toml::from_str("[api]\ntimeout_secs = 3").unwrap();
        assert_eq!(config.api.timeout(), Duration::from_secs(3));
    }
}
