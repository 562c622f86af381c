//! Configuration loading.
//!
//! Precedence for the API base URL, highest first:
//! 1. `--api-url` flag
//! 2. `TASKDECK_API_URL` environment variable
//! 3. `api.base_url` in `config.toml`
//! 4. the built-in default

use crate::paths::TaskdeckPaths;
use std::fs;
use taskdeck_core::Result;
use taskdeck_core::config::{API_URL_ENV, ClientConfig};

/// Values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// From the command line.
    pub api_url: Option<String>,
    /// From the environment.
    pub env_api_url: Option<String>,
}

impl ConfigOverrides {
    /// Captures the environment alongside an optional flag value.
    pub fn from_env(api_url: Option<String>) -> Self {
        Self {
            api_url,
            env_api_url: std::env::var(API_URL_ENV).ok(),
        }
    }

    fn base_url(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .or(self.env_api_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Reads `config.toml` and applies overrides.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: TaskdeckPaths,
}

impl ConfigService {
    pub fn new(paths: TaskdeckPaths) -> Self {
        Self { paths }
    }

    /// Loads `config.toml`; a missing or empty file yields the defaults.
    pub fn load(&self) -> Result<ClientConfig> {
        let path = self.paths.config_file();
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    /// Loads the file and layers `overrides` on top.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<ClientConfig> {
        let mut config = self.load()?;
        if let Some(url) = overrides.base_url() {
            config.api.base_url = url.to_string();
        }
        config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
