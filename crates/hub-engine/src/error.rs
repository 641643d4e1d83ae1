//! Error types for the hub engine

use thiserror::Error;

/// Errors that can occur in the hub engine
#[derive(Error, Debug)]
pub enum HubError {
    /// Duration string does not follow the `<N>h<N>m<N>s` grammar
    #[error("Invalid duration format: {0:?}")]
    InvalidDuration(String),

    /// Light time is neither a time of day nor "sunset"
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    /// Requested history size is out of range
    #[error("Requested size must be between 1 and {max}, got {requested}")]
    InvalidSize { requested: usize, max: usize },

    /// No settings have been applied yet
    #[error("No settings found")]
    NoSettings,

    /// No sensor readings have been recorded yet
    #[error("No sensor data available")]
    NoReadings,

    /// Invalid cron expression for a scheduled job
    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),
}

impl HubError {
    /// Whether the error was caused by bad caller input
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration(_) | Self::InvalidTimeFormat(_) | Self::InvalidSize { .. }
        )
    }

    /// Whether the error reports missing state
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSettings | Self::NoReadings)
    }
}

/// Errors from the external sunset lookup.
///
/// These never reach callers of the resolver; they are logged and replaced
/// by the fallback sunset.
#[derive(Error, Debug)]
pub enum SunsetError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Sunset API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The API answered with a status marker other than "OK"
    #[error("Sunset API error: {0}")]
    Api(String),

    /// Payload did not contain a usable sunset instant
    #[error("Malformed sunset payload: {0}")]
    Payload(#[from] serde_json::Error),
}
