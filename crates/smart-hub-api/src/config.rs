//! Server configuration from environment variables

use anyhow::Context;
use hub_engine::config::DEFAULT_SUNSET_API_URL;
use hub_engine::{HubConfig, Location};
use std::net::SocketAddr;

const DEFAULT_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGIN: &str = "https://simple-smart-hub-client.netlify.app";

/// Everything the server needs at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// The single frontend origin allowed by CORS
    pub cors_origin: String,
    pub sunset_api_url: String,
    pub hub: HubConfig,
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = get("SMART_HUB_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .with_context(|| format!("SMART_HUB_ADDR is not a socket address: {addr}"))?;

        let defaults = HubConfig::default();
        let default_location = Location {
            lat: parse_coordinate(&get, "SMART_HUB_LAT", defaults.default_location.lat)?,
            lng: parse_coordinate(&get, "SMART_HUB_LNG", defaults.default_location.lng)?,
        };

        Ok(Self {
            addr,
            cors_origin: get("SMART_HUB_CORS_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            sunset_api_url: get("SUNSET_API_URL")
                .unwrap_or_else(|| DEFAULT_SUNSET_API_URL.to_string()),
            hub: HubConfig {
                default_location,
                purge_schedule: get("SUNSET_PURGE_CRON").unwrap_or(defaults.purge_schedule),
                refresh_schedule: get("SUNSET_REFRESH_CRON").unwrap_or(defaults.refresh_schedule),
                ..defaults
            },
        })
    }
}

fn parse_coordinate(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f64,
) -> anyhow::Result<f64> {
    match get(key) {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("{key} is not a number: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.cors_origin, DEFAULT_CORS_ORIGIN);
        assert_eq!(config.sunset_api_url, DEFAULT_SUNSET_API_URL);
        assert_eq!(config.hub.default_location, Location::default());
        assert_eq!(config.hub.purge_schedule, "0 0 0 * * *");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SMART_HUB_ADDR", "127.0.0.1:9000"),
            ("SMART_HUB_LAT", "51.5"),
            ("SMART_HUB_LNG", "-0.12"),
            ("SUNSET_REFRESH_CRON", "0 30 1 * * *"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.hub.default_location, Location { lat: 51.5, lng: -0.12 });
        assert_eq!(config.hub.refresh_schedule, "0 30 1 * * *");
    }

    #[test]
    fn test_malformed_values_fail() {
        assert!(config_from(&[("SMART_HUB_ADDR", "nowhere")]).is_err());
        assert!(config_from(&[("SMART_HUB_LAT", "north")]).is_err());
    }
}
