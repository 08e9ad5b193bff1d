//! Error types for burnbox.

/// Top-level error type for the agent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session manager is not running")]
    ManagerGone,
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failure to provision a disposable address.
///
/// Surfaced to the generate requester as-is; never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Provider returned status {status}")]
    Status { status: u16 },

    #[error("Malformed provisioning response: {0}")]
    MalformedResponse(String),

    #[error("Request failed: {0}")]
    Network(String),
}

/// Failure on a single poll tick.
///
/// Logged and swallowed by the session manager — a failed tick never stops
/// polling.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Provider returned status {status}")]
    Status { status: u16 },

    #[error("Malformed message list: {0}")]
    MalformedResponse(String),

    #[error("Request failed: {0}")]
    Network(String),
}

/// Persistent-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the agent.
pub type Result<T> = std::result::Result<T, Error>;
