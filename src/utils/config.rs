//! Layered configuration
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Config file (`$SESSION_REPLAY_CONFIG`, else optional `session-replay.{toml,yaml,json}`)
//! 3. Environment variables, e.g. `SESSION_REPLAY__CLIENT__BATCH_SIZE=25`

use crate::utils::errors::{ReplayError, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SESSION_REPLAY_CONFIG";

/// Base name of the optional config file in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "session-replay";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SESSION_REPLAY";

/// Default delivery endpoint, relative to the transport origin
pub const DEFAULT_API_ENDPOINT: &str = "/api/session-replay/events";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub client: ClientConfig,
    pub transport: TransportConfig,
    pub fallback: FallbackConfig,
    pub observability: ObservabilityConfig,
}

/// Capture client options. Immutable once a client is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Delivery URL (absolute, or relative to the transport origin)
    #[serde(alias = "apiEndpoint")]
    pub api_endpoint: String,

    /// Queue length that triggers an immediate flush
    #[serde(alias = "batchSize")]
    pub batch_size: usize,

    /// Periodic flush period (milliseconds)
    #[serde(alias = "flushInterval")]
    pub flush_interval_ms: u64,

    /// Delivery attempts per batch before falling back to local storage
    #[serde(alias = "maxRetries")]
    pub max_retries: u32,

    /// Admission cap per rolling one-second window
    #[serde(alias = "maxEventsPerSecond")]
    pub max_events_per_second: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            batch_size: 10,
            flush_interval_ms: 5000,
            max_retries: 3,
            max_events_per_second: 100,
        }
    }
}

impl ClientConfig {
    /// Validate client options
    pub fn validate(&self) -> Result<()> {
        if self.api_endpoint.trim().is_empty() {
            return Err(ReplayError::InvalidConfig(
                "api_endpoint cannot be empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ReplayError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(ReplayError::InvalidConfig(
                "flush_interval_ms must be positive".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ReplayError::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.max_events_per_second == 0 {
            return Err(ReplayError::InvalidConfig(
                "max_events_per_second must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outbound HTTP options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL that relative endpoints resolve against
    pub origin: String,

    /// Deliver teardown flushes through the fire-and-forget beacon
    pub beacon: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8080".to_string(),
            beacon: true,
        }
    }
}

/// Where undeliverable batches are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub backend: FallbackBackend,

    /// SQLite database file (sqlite backend only)
    pub path: PathBuf,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            backend: FallbackBackend::Sqlite,
            path: PathBuf::from("session-replay-fallback.db"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address
    pub metrics_listen: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_listen: None,
        }
    }
}

impl ReplayConfig {
    /// Load from the default sources
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref())
    }

    /// Load with an explicit config file (required when given)
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let builder = match path {
            Some(path) => Config::builder().add_source(File::with_name(path).required(true)),
            None => Config::builder()
                .add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        let config: ReplayConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        if !self.client.api_endpoint.starts_with("http://")
            && !self.client.api_endpoint.starts_with("https://")
            && self.transport.origin.trim().is_empty()
        {
            return Err(ReplayError::InvalidConfig(
                "relative api_endpoint requires a transport origin".to_string(),
            ));
        }
        Ok(())
    }
}
