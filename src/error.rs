use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the feed service
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Feed fetch error: {0}")]
    #[diagnostic(code(ics_feed::fetch))]
    Fetch(String),

    #[error("Calendar parse error: {0}")]
    #[diagnostic(code(ics_feed::primary_parse))]
    PrimaryParse(String),

    #[error("Could not parse date/time '{token}': {reason}")]
    #[diagnostic(code(ics_feed::date_parse))]
    DateParse { token: String, reason: String },

    #[error("Unknown time zone: {0}")]
    #[diagnostic(code(ics_feed::zone_resolution))]
    ZoneResolution(String),

    #[error("No usable events could be extracted from the feed")]
    #[diagnostic(
        code(ics_feed::no_usable_events),
        help("the feed could not be parsed and contained no readable VEVENT blocks")
    )]
    NoUsableEvents,

    #[error("Invalid request: {0}")]
    #[diagnostic(code(ics_feed::invalid_request))]
    InvalidRequest(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(ics_feed::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ics_feed::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(ics_feed::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(ics_feed::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(ics_feed::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Fetch(format!("request timed out: {}", err))
        } else {
            Error::Fetch(err.to_string())
        }
    }
}

/// Type alias for Result with our Error type
pub type FeedResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create date parse errors
pub fn date_parse_error(token: &str, reason: &str) -> Error {
    Error::DateParse {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

/// Helper to create zone resolution errors
pub fn zone_error(name: &str) -> Error {
    Error::ZoneResolution(name.to_string())
}

/// Helper to create invalid request errors
pub fn invalid_request(message: &str) -> Error {
    Error::InvalidRequest(message.to_string())
}
