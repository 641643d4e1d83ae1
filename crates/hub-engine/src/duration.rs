//! Duration parsing and time-of-day conversions
//!
//! Durations use the compact `<N>h<N>m<N>s` form ("1h30m", "45s"). Times of
//! day are `chrono::NaiveTime` values and convert to and from a duration
//! since midnight, wrapping modulo 24 hours.

use crate::error::HubError;
use chrono::{NaiveTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("duration pattern is valid")
});

/// Parse a compact duration string such as "1h30m" or "45s".
///
/// Every segment is optional but they must appear in `h`, `m`, `s` order.
/// The empty string is a zero duration.
pub fn parse_duration(s: &str) -> Result<Duration, HubError> {
    let invalid = || HubError::InvalidDuration(s.to_string());
    let caps = DURATION_RE.captures(s).ok_or_else(invalid)?;

    let mut total: u64 = 0;
    for (index, unit) in [(1, 3600u64), (2, 60), (3, 1)] {
        let Some(segment) = caps.get(index) else {
            continue;
        };
        let value: u64 = segment.as_str().parse().map_err(|_| invalid())?;
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
    }

    Ok(Duration::from_secs(total))
}

/// Render a duration as zero-padded `HH:MM:SS`, wrapped modulo 24 hours
#[must_use]
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs() % SECONDS_PER_DAY;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Interpret a duration as time since midnight
#[must_use]
pub fn time_of_day(since_midnight: Duration) -> NaiveTime {
    let secs = (since_midnight.as_secs() % SECONDS_PER_DAY) as u32;
    // secs < 86400, always representable
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
}

/// Duration elapsed since midnight at the given time of day
#[must_use]
pub fn since_midnight(time: NaiveTime) -> Duration {
    Duration::from_secs(u64::from(time.num_seconds_from_midnight()))
}

/// Add a duration to a time of day, wrapping past midnight
#[must_use]
pub fn add_wrapping(time: NaiveTime, duration: Duration) -> NaiveTime {
    let offset = duration.as_secs() % SECONDS_PER_DAY;
    time_of_day(since_midnight(time) + Duration::from_secs(offset))
}

/// Parse a literal time of day in `HH:MM:SS` or `HH:MM` form
///
/// Leap seconds (`23:59:60`) are rejected: seconds must lie in `[0, 60)`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, HubError> {
    let invalid = || HubError::InvalidTimeFormat(s.to_string());
    let time = NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| invalid())?;
    // chrono encodes a leap second as nanosecond >= 1e9
    if time.nanosecond() >= 1_000_000_000 {
        return Err(invalid());
    }
    Ok(time)
}
