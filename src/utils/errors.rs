//! Error types for the session replay client

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Errors raised by the capture and delivery pipeline
///
/// None of these reach the host application through the capture path:
/// delivery and persistence failures are logged and absorbed by the client.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Endpoint responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("Fallback storage failed: {0}")]
    StorageFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No async runtime available: {0}")]
    RuntimeUnavailable(String),

    #[error("Observability setup failed: {0}")]
    Observability(String),
}

impl From<::config::ConfigError> for ReplayError {
    fn from(e: ::config::ConfigError) -> Self {
        ReplayError::Config(e.to_string())
    }
}

impl From<rusqlite::Error> for ReplayError {
    fn from(e: rusqlite::Error) -> Self {
        ReplayError::StorageFailed(e.to_string())
    }
}
