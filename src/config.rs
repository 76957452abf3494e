use crate::error::{config_error, env_error, FeedResult};
use crate::utils::time::parse_timezone;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Default port the API listens on
pub const DEFAULT_PORT: u16 = 8076;
/// Default timeout for fetching a feed
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
/// Default number of days to look back from now
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;
/// Default number of days to look ahead from now
pub const DEFAULT_HORIZON_DAYS: i64 = 3650;

/// Location of the optional configuration file
const CONFIG_FILE: &str = "config/feed.toml";

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA name of the zone events are rendered in
    pub timezone: String,
    /// Interface to bind the HTTP server to
    pub host: String,
    /// Port to bind the HTTP server to
    pub port: u16,
    /// Timeout for a single feed fetch, in seconds
    pub fetch_timeout_secs: u64,
    /// Default window start, in days before now
    pub default_lookback_days: i64,
    /// Default window end, in days after now
    pub default_horizon_days: i64,
}

/// Values read from `config/feed.toml`; present keys override the environment
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    timezone: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    fetch_timeout_secs: Option<u64>,
    default_lookback_days: Option<i64>,
    default_horizon_days: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: String::from("UTC"),
            host: String::from("0.0.0.0"),
            port: DEFAULT_PORT,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
            default_horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> FeedResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_env()?;

        if Path::new(CONFIG_FILE).exists() {
            let content = fs::read_to_string(CONFIG_FILE)?;
            config.merge_toml(&content)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> FeedResult<Self> {
        let defaults = Self::default();

        Ok(Config {
            timezone: env::var("TIMEZONE").unwrap_or(defaults.timezone),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
            fetch_timeout_secs: env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs)?,
            default_lookback_days: env_or("DEFAULT_LOOKBACK_DAYS", defaults.default_lookback_days)?,
            default_horizon_days: env_or("DEFAULT_HORIZON_DAYS", defaults.default_horizon_days)?,
        })
    }

    /// Override fields with the keys present in a TOML document
    pub fn merge_toml(&mut self, content: &str) -> FeedResult<()> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(timezone) = file.timezone {
            self.timezone = timezone;
        }
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(timeout) = file.fetch_timeout_secs {
            self.fetch_timeout_secs = timeout;
        }
        if let Some(days) = file.default_lookback_days {
            self.default_lookback_days = days;
        }
        if let Some(days) = file.default_horizon_days {
            self.default_horizon_days = days;
        }

        Ok(())
    }

    /// Check that the configured values are usable
    pub fn validate(&self) -> FeedResult<()> {
        parse_timezone(&self.timezone)
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", self.timezone)))?;

        if self.fetch_timeout_secs == 0 {
            return Err(config_error("FETCH_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(())
    }

    /// The configured zone as a chrono-tz value
    pub fn local_zone(&self) -> FeedResult<Tz> {
        parse_timezone(&self.timezone)
    }
}

/// Read a numeric environment variable, falling back to a default when unset
fn env_or<T: FromStr>(var: &str, default: T) -> FeedResult<T> {
    match env::var(var) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| env_error(var)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_toml_overrides_present_keys() {
        let mut config = Config::default();
        config
            .merge_toml("timezone = \"Europe/Helsinki\"\nport = 9000\n")
            .unwrap();

        assert_eq!(config.timezone, "Europe/Helsinki");
        assert_eq!(config.port, 9000);
        // Untouched keys keep their values
        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(config.default_horizon_days, DEFAULT_HORIZON_DAYS);
    }

    #[test]
    fn test_merge_toml_rejects_bad_types() {
        let mut config = Config::default();
        assert!(config.merge_toml("port = \"not a number\"").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            fetch_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
