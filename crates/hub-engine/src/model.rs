//! Data models for the hub engine

use crate::duration::format_hms;
use crate::window::LightWindow;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Literal accepted in place of a light time to track the daily sunset
pub const SUNSET_KEYWORD: &str = "sunset";

/// Request to replace the device settings
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsRequest {
    /// Record id; generated when absent
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Target temperature at or above which the fan runs
    pub user_temp: i32,
    /// Light-on time (`HH:MM:SS` / `HH:MM`) or "sunset"
    pub user_light: String,
    /// How long the light stays on, in `<N>h<N>m<N>s` form
    pub light_duration: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl SettingsRequest {
    /// Whether the light-on time should follow the sunset
    #[must_use]
    pub fn wants_sunset(&self) -> bool {
        self.user_light.eq_ignore_ascii_case(SUNSET_KEYWORD)
    }
}

/// The active device settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub id: Uuid,
    pub target_temp: i32,
    pub window: LightWindow,
    /// Parsed light duration, kept so the window can be rebuilt from a new sunset
    pub light_duration: Duration,
    pub from_sunset: bool,
}

impl Settings {
    /// Rendered form returned to clients
    #[must_use]
    pub fn to_record(&self) -> SettingsRecord {
        SettingsRecord {
            id: self.id,
            user_temp: self.target_temp,
            user_light: self.window.on.format("%H:%M:%S").to_string(),
            light_time_off: self.window.off.format("%H:%M:%S").to_string(),
            light_duration: format_hms(self.light_duration),
            from_sunset: self.from_sunset,
        }
    }
}

/// Settings as rendered on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub id: Uuid,
    pub user_temp: i32,
    pub user_light: String,
    pub light_time_off: String,
    pub light_duration: String,
    pub from_sunset: bool,
}

/// Result of applying a settings request
#[derive(Debug, Clone)]
pub struct AppliedSettings {
    pub settings: Settings,
    /// True when no settings existed before
    pub created: bool,
}

/// A sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature: f64,
    pub presence: bool,
    /// Local time the reading was taken; defaults to now
    #[serde(default = "Local::now")]
    pub date_time: DateTime<Local>,
}

#[cfg(test)]
impl Reading {
    /// Reading taken now
    pub(crate) fn now(temperature: f64, presence: bool) -> Self {
        Self {
            temperature,
            presence,
            date_time: Local::now(),
        }
    }
}

/// A history entry as returned by graph queries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPoint {
    pub temperature: f64,
    pub presence: bool,
    pub datetime: DateTime<Local>,
}

impl From<Reading> for GraphPoint {
    fn from(reading: Reading) -> Self {
        Self {
            temperature: reading.temperature,
            presence: reading.presence,
            datetime: reading.date_time,
        }
    }
}

/// Actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// Commands sent back to the device for a reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub fan: Switch,
    pub light: Switch,
    /// Set to "none" when no settings are configured yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<&'static str>,
}

impl Command {
    /// Everything off because no settings exist
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            fan: Switch::Off,
            light: Switch::Off,
            settings: Some("none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_sunset_keyword_is_case_insensitive() {
        let mut request: SettingsRequest = serde_json::from_value(serde_json::json!({
            "user_temp": 25,
            "user_light": "SunSet",
            "light_duration": "4h"
        }))
        .unwrap();
        assert!(request.wants_sunset());
        assert!(request.id.is_none());
        assert!(request.lat.is_none());

        request.user_light = "18:00:00".to_string();
        assert!(!request.wants_sunset());
    }

    #[test]
    fn test_record_rendering() {
        let settings = Settings {
            id: Uuid::nil(),
            target_temp: 24,
            window: LightWindow {
                on: NaiveTime::from_hms_opt(18, 5, 9).unwrap(),
                off: NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
            },
            light_duration: Duration::from_secs(6 * 3600 + 54 * 60 + 51),
            from_sunset: true,
        };
        let record = settings.to_record();
        assert_eq!(record.user_light, "18:05:09");
        assert_eq!(record.light_time_off, "01:00:00");
        assert_eq!(record.light_duration, "06:54:51");
        assert_eq!(record.user_temp, 24);
    }

    #[test]
    fn test_reading_defaults_timestamp() {
        let before = Local::now();
        let reading: Reading =
            serde_json::from_str(r#"{"temperature": 27.5, "presence": true}"#).unwrap();
        assert!(reading.date_time >= before);
        assert!(reading.presence);
    }

    #[test]
    fn test_unconfigured_command_json() {
        let json = serde_json::to_value(Command::unconfigured()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fan": "off", "light": "off", "settings": "none"})
        );

        let json = serde_json::to_value(Command {
            fan: Switch::On,
            light: Switch::Off,
            settings: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"fan": "on", "light": "off"}));
    }
}
