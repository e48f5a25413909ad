//! Configuration for the submission client
//!
//! Callers construct components from an explicit [`SubmitterConfig`]
//! passed down at build time; nothing reads ambient process-wide state.
//! Loading supports TOML files, JSON files, and environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::submit::SubmitPolicy;
use crate::types::Endpoint;

/// Recognized configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitterConfig {
    /// URL of the remote execution endpoint
    pub endpoint_url: String,

    /// Network identifier (cluster name)
    #[serde(default = "default_network")]
    pub network: String,

    /// Overall confirmation timeout per submission, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base status-poll interval in milliseconds (grows exponentially)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on the backed-off poll interval, in milliseconds
    #[serde(default = "default_poll_max_interval_ms")]
    pub poll_max_interval_ms: u64,

    /// Reconnect attempts per submission before surfacing a connection error
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

fn default_network() -> String {
    "localnet".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_poll_max_interval_ms() -> u64 {
    5_000
}

fn default_max_reconnect_attempts() -> u32 {
    3
}

impl SubmitterConfig {
    /// Build a config for an endpoint URL with default policy values
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            endpoint_url: url.into(),
            network: default_network(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_interval_ms: default_poll_max_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("failed to read config file {}: {}", path, e)))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("failed to read config file {}: {}", path, e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Recognized: `FERRY_ENDPOINT_URL` (required), `FERRY_NETWORK`,
    /// `FERRY_TIMEOUT_MS`, `FERRY_POLL_INTERVAL_MS`,
    /// `FERRY_POLL_MAX_INTERVAL_MS`, `FERRY_MAX_RECONNECT_ATTEMPTS`.
    /// A `.env` file in the working directory is honored if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let endpoint_url = std::env::var("FERRY_ENDPOINT_URL")
            .map_err(|_| ConfigError::MissingEnv("FERRY_ENDPOINT_URL".to_string()))?;

        let config = Self {
            endpoint_url,
            network: std::env::var("FERRY_NETWORK").unwrap_or_else(|_| default_network()),
            timeout_ms: env_u64("FERRY_TIMEOUT_MS", default_timeout_ms())?,
            poll_interval_ms: env_u64("FERRY_POLL_INTERVAL_MS", default_poll_interval_ms())?,
            poll_max_interval_ms: env_u64(
                "FERRY_POLL_MAX_INTERVAL_MS",
                default_poll_max_interval_ms(),
            )?,
            max_reconnect_attempts: env_u64(
                "FERRY_MAX_RECONNECT_ATTEMPTS",
                default_max_reconnect_attempts() as u64,
            )? as u32,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "invalid endpoint URL: {}",
                self.endpoint_url
            )));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be > 0".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        if self.poll_max_interval_ms < self.poll_interval_ms {
            return Err(ConfigError::Validation(format!(
                "poll_max_interval_ms ({}) must be >= poll_interval_ms ({})",
                self.poll_max_interval_ms, self.poll_interval_ms
            )));
        }

        Ok(())
    }

    /// The endpoint this configuration points at
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.endpoint_url.clone(), self.network.clone())
    }

    /// The submission policy these options describe
    pub fn policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
            poll_max_interval_ms: self.poll_max_interval_ms,
            max_reconnect_attempts: self.max_reconnect_attempts,
            ..SubmitPolicy::default()
        }
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::Validation(format!("{} must be an integer: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Configuration-related errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
}
