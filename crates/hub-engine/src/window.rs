//! Light window evaluation

use crate::duration::add_wrapping;
use chrono::NaiveTime;
use std::time::Duration;

/// The daily interval during which the light may be on.
///
/// `off` earlier than `on` means the window crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightWindow {
    pub on: NaiveTime,
    pub off: NaiveTime,
}

impl LightWindow {
    /// Window opening at `on` and lasting `duration` (wrapped to one day)
    #[must_use]
    pub fn starting_at(on: NaiveTime, duration: Duration) -> Self {
        Self {
            on,
            off: add_wrapping(on, duration),
        }
    }

    /// Whether the window wraps past midnight
    fn crosses_midnight(&self) -> bool {
        self.on > self.off
    }

    /// Whether `now` falls inside the window. Both ends are inclusive.
    #[must_use]
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.crosses_midnight() {
            // Wrap-around window (e.g., 22:00 to 06:00)
            now >= self.on || now <= self.off
        } else {
            // Same-day window (e.g., 08:00 to 20:00)
            now >= self.on && now <= self.off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn window(on: (u32, u32), off: (u32, u32)) -> LightWindow {
        LightWindow {
            on: hms(on.0, on.1, 0),
            off: hms(off.0, off.1, 0),
        }
    }

    #[test]
    fn test_same_day_window() {
        let w = window((8, 0), (20, 0));
        assert!(!w.crosses_midnight());
        assert!(w.contains(hms(12, 0, 0)));
        assert!(!w.contains(hms(21, 0, 0)));
        assert!(!w.contains(hms(7, 59, 59)));
    }

    #[test]
    fn test_same_day_window_boundaries_inclusive() {
        let w = window((8, 0), (20, 0));
        assert!(w.contains(hms(8, 0, 0)));
        assert!(w.contains(hms(20, 0, 0)));
        assert!(!w.contains(hms(20, 0, 1)));
    }

    #[test]
    fn test_wrapping_window() {
        let w = window((22, 0), (6, 0));
        assert!(w.crosses_midnight());
        assert!(w.contains(hms(23, 30, 0)));
        assert!(w.contains(hms(0, 0, 0)));
        assert!(w.contains(hms(6, 0, 0)));
        assert!(w.contains(hms(22, 0, 0)));
        assert!(!w.contains(hms(12, 0, 0)));
        assert!(!w.contains(hms(6, 0, 1)));
        assert!(!w.contains(hms(21, 59, 59)));
    }

    #[test]
    fn test_zero_length_window() {
        let w = window((18, 0), (18, 0));
        assert!(w.contains(hms(18, 0, 0)));
        assert!(!w.contains(hms(18, 0, 1)));
    }

    #[test]
    fn test_starting_at_wraps_duration() {
        let w = LightWindow::starting_at(hms(18, 45, 0), Duration::from_secs(6 * 3600));
        assert_eq!(w.off, hms(0, 45, 0));
        assert!(w.crosses_midnight());
        assert!(w.contains(hms(0, 30, 0)));
    }
}
