//! Engine configuration

use chrono::NaiveTime;

/// Default sunset lookup endpoint
pub const DEFAULT_SUNSET_API_URL: &str = "https://api.sunrise-sunset.org/json";

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Default for Location {
    /// Antigua and Barbuda
    fn default() -> Self {
        Self {
            lat: 17.074656,
            lng: -61.817520,
        }
    }
}

/// Settings for the hub engine
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Used for sunset lookups when a request has no coordinates, and by
    /// the daily refresh
    pub default_location: Location,
    /// Local sunset assumed when the lookup fails
    pub fallback_sunset: NaiveTime,
    /// Cron expression for the sunset cache purge
    pub purge_schedule: String,
    /// Cron expression for the sunset recompute; runs after the purge
    pub refresh_schedule: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            default_location: Location::default(),
            fallback_sunset: NaiveTime::from_hms_opt(18, 45, 0).unwrap_or(NaiveTime::MIN),
            purge_schedule: "0 0 0 * * *".to_string(),
            refresh_schedule: "0 5 0 * * *".to_string(),
        }
    }
}
