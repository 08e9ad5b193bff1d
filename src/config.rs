//! Configuration, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// How long a disposable address stays valid.
pub const SESSION_TTL: Duration = Duration::from_millis(600_000);

/// Fixed delay between poll ticks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5_000);

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the mail provider API (no trailing slash).
    pub api_base: String,
    /// Static API key sent as `X-API-Key` on every request.
    pub api_key: SecretString,
    /// Path of the persisted session snapshot.
    pub state_path: PathBuf,
    /// Delay between poll ticks.
    pub poll_interval: Duration,
    /// Session time-to-live.
    pub session_ttl: Duration,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// `BURNBOX_API_BASE` and `BURNBOX_API_KEY` are required; everything
    /// else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = std::env::var("BURNBOX_API_BASE")
            .map_err(|_| ConfigError::MissingEnvVar("BURNBOX_API_BASE".into()))?
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("BURNBOX_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("BURNBOX_API_KEY".into()))?;

        let state_path = std::env::var("BURNBOX_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/session.json"));

        let poll_interval = match std::env::var("BURNBOX_POLL_INTERVAL_MS") {
            Ok(raw) => {
                let ms: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "BURNBOX_POLL_INTERVAL_MS".into(),
                    message: format!("not a millisecond count: {raw:?}"),
                })?;
                Duration::from_millis(ms)
            }
            Err(_) => POLL_INTERVAL,
        };

        Ok(Self {
            api_base,
            api_key: SecretString::from(api_key),
            state_path,
            poll_interval,
            session_ttl: SESSION_TTL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_ten_minutes() {
        assert_eq!(SESSION_TTL, Duration::from_secs(600));
    }

    #[test]
    fn poll_interval_is_five_seconds() {
        assert_eq!(POLL_INTERVAL, Duration::from_secs(5));
    }
}
