//! Configuration for the sync runtime.

use std::env;
use std::time::Duration;

/// Tunables for the sync orchestrator and transport.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote endpoint URL (single sink for all categories)
    pub endpoint: String,
    /// Period between full sync passes
    pub interval: Duration,
    /// Delay before the first sync after startup, so local state settles
    pub startup_delay: Duration,
    /// Pause between categories within one pass, to go easy on the remote
    pub throttle: Duration,
    /// Whether the remote channel yields opaque (unreadable) responses
    pub opaque: bool,
}

impl SyncConfig {
    /// Configuration with the stock timings: 30s interval, 5s startup delay.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            interval: Duration::from_secs(30),
            startup_delay: Duration::from_secs(5),
            throttle: Duration::from_millis(250),
            opaque: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `SYNC_ENDPOINT` is required; `SYNC_INTERVAL_MS`, `SYNC_STARTUP_DELAY_MS`,
    /// `SYNC_THROTTLE_MS` and `SYNC_OPAQUE` override the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env::var("SYNC_ENDPOINT").map_err(|_| ConfigError::MissingEndpoint)?;

        let mut config = Self::new(endpoint);

        if let Some(ms) = read_millis("SYNC_INTERVAL_MS")? {
            config.interval = ms;
        }
        if let Some(ms) = read_millis("SYNC_STARTUP_DELAY_MS")? {
            config.startup_delay = ms;
        }
        if let Some(ms) = read_millis("SYNC_THROTTLE_MS")? {
            config.throttle = ms;
        }
        if let Ok(raw) = env::var("SYNC_OPAQUE") {
            config.opaque = matches!(raw.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

fn read_millis(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidMillis(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SYNC_ENDPOINT environment variable is required")]
    MissingEndpoint,

    #[error("{0} must be an integer number of milliseconds")]
    InvalidMillis(&'static str),
}
