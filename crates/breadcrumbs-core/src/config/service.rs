//! Configuration structure

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::ModelSettings;

use super::env::apply_env_overrides;
use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;

pub const DEFAULT_BIND: &str = "127.0.0.1:8181";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Accepted bearer tokens; empty disables authentication
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            api_keys: Vec::new(),
        }
    }
}

/// Per-request and service-wide limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Overall deadline of one conversation
    pub timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub max_message_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrent_requests: 16,
            max_message_chars: 8000,
        }
    }
}

/// Complete service configuration
///
/// ```yaml
/// model:
///   provider: anthropic
///   model: claude-3-5-haiku-latest
/// server:
///   bind: 0.0.0.0:8181
///   api_keys: [demo-key-123]
/// limits:
///   timeout_secs: 20
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub model: ModelSettings,
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    /// Replaces the built-in opening instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ServiceConfig {
    /// Load from `path` (or the user config file), apply environment
    /// overrides and validate
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => ConfigFile::new(path),
            None => ConfigFile::user(),
        };
        let mut config = file.load()?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.model.provider.trim().is_empty() {
            return Err(ConfigError::invalid("model.provider", "must not be empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::invalid("model.model", "must not be empty"));
        }
        if let Some(temperature) = self.model.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::invalid("model.temperature", "must be between 0.0 and 2.0"));
            }
        }
        self.bind_addr()?;
        if self.server.api_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::invalid("server.api_keys", "keys must not be blank"));
        }
        if self.limits.timeout_secs == 0 {
            return Err(ConfigError::invalid("limits.timeout_secs", "must be greater than zero"));
        }
        if self.limits.max_concurrent_requests == 0 {
            return Err(ConfigError::invalid("limits.max_concurrent_requests", "must be greater than zero"));
        }
        if self.limits.max_message_chars == 0 {
            return Err(ConfigError::invalid("limits.max_message_chars", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> ConfigResult<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::invalid("server.bind", format!("{:?}: {}", self.server.bind, e)))
    }

    /// Deadline applied to each conversation
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.limits.timeout_secs)
    }
}
