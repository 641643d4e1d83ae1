//! Fan and light decisions for incoming readings

use crate::model::{Command, Reading, Settings, Switch};

/// Derive actuator commands for a reading.
///
/// The fan runs when someone is present and the temperature has reached the
/// target. The light needs presence and the reading's local time of day
/// inside the light window.
#[must_use]
pub fn decide(settings: Option<&Settings>, reading: &Reading) -> Command {
    let Some(settings) = settings else {
        return Command::unconfigured();
    };

    let fan = reading.presence && reading.temperature >= f64::from(settings.target_temp);
    let light = reading.presence && settings.window.contains(reading.date_time.time());

    Command {
        fan: Switch::from(fan),
        light: Switch::from(light),
        settings: None,
    }
}
