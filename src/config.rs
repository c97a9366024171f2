//! Runtime configuration derived from CLI arguments and environment

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::cli::Cli;

/// Error types for configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The store location is not one of `memory`, `file[:dir]`, `redis://..`
    #[error("Invalid store: '{0}'. Use memory, file, file:<dir> or a redis:// URL")]
    InvalidStore(String),

    /// The display timezone is not an IANA timezone name
    #[error("Invalid timezone: '{0}'. Use an IANA name such as America/New_York")]
    InvalidTimezone(String),

    /// HTTP timeout of zero seconds
    #[error("Timeout must be at least one second")]
    InvalidTimeout,
}

/// Which cache provider to open at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSpec {
    Memory,
    /// File store in the given directory, or the XDG cache directory
    File(Option<PathBuf>),
    /// Redis connection URL
    Redis(String),
}

impl FromStr for StoreSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("memory") {
            return Ok(StoreSpec::Memory);
        }
        if s.eq_ignore_ascii_case("file") {
            return Ok(StoreSpec::File(None));
        }
        if let Some(dir) = s.strip_prefix("file:") {
            if dir.is_empty() {
                return Err(ConfigError::InvalidStore(s.to_string()));
            }
            return Ok(StoreSpec::File(Some(PathBuf::from(dir))));
        }
        if s.starts_with("redis://") || s.starts_with("rediss://") {
            return Ok(StoreSpec::Redis(s.to_string()));
        }
        Err(ConfigError::InvalidStore(s.to_string()))
    }
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub api_key_header: String,
    pub store: StoreSpec,
    /// Timezone kickoff dates and times are rendered in
    pub display_timezone: Tz,
    /// HTTP request timeout for upstream calls
    pub timeout: Duration,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Config)` with validated settings
    /// * `Err(ConfigError)` if the store, timezone or timeout is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let store = cli.store.parse()?;
        let display_timezone = cli
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(cli.timezone.clone()))?;
        if cli.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(Config {
            api_key: cli.api_key.clone(),
            api_url: cli.api_url.clone(),
            api_key_header: cli.api_key_header.clone(),
            store,
            display_timezone,
            timeout: Duration::from_secs(cli.timeout_secs),
            log_json: cli.log_json,
        })
    }
}
