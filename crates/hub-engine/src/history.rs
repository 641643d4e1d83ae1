//! Bounded reading history, newest first

use crate::error::HubError;
use crate::model::Reading;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Maximum number of readings kept
pub const MAX_READINGS: usize = 500;

/// Ring buffer of the most recent readings
pub struct ReadingHistory {
    readings: RwLock<VecDeque<Reading>>,
    capacity: usize,
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(VecDeque::with_capacity(MAX_READINGS)),
            capacity: MAX_READINGS,
        }
    }

    /// Record a reading, evicting the oldest one when full
    pub async fn push(&self, reading: Reading) {
        let mut readings = self.readings.write().await;
        readings.push_front(reading);
        readings.truncate(self.capacity);
    }

    /// Up to `count` most recent readings, newest first.
    ///
    /// `count` must be within 1..=500; an empty history is reported as
    /// [`HubError::NoReadings`].
    pub async fn latest(&self, count: usize) -> Result<Vec<Reading>, HubError> {
        if count == 0 || count > self.capacity {
            return Err(HubError::InvalidSize {
                requested: count,
                max: self.capacity,
            });
        }

        let readings = self.readings.read().await;
        if readings.is_empty() {
            return Err(HubError::NoReadings);
        }
        Ok(readings.iter().take(count).cloned().collect())
    }

    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }
}
