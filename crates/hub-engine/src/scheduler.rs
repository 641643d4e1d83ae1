//! Scheduler for the daily maintenance jobs

use crate::error::HubError;
use chrono::Local;
use cron::Schedule;
use dashmap::DashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Recurring jobs run by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Drop sunset cache entries from previous days
    PurgeSunsetCache,
    /// Re-resolve the sunset and move a sunset-derived light window
    RefreshSunset,
}

/// Events emitted by the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerEvent {
    pub job: Job,
}

/// Fires jobs on cron schedules (local time)
pub struct Scheduler {
    /// Active timer handles (keyed by job)
    timers: Arc<DashMap<Job, JoinHandle<()>>>,
    /// Event sender for fired jobs
    event_tx: broadcast::Sender<SchedulerEvent>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a new scheduler
    #[must_use]
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            timers: Arc::new(DashMap::new()),
            event_tx,
        }
    }

    /// Subscribe to scheduler events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.event_tx.subscribe()
    }

    /// Schedule `job` on a 6-field cron expression, replacing any existing timer
    pub fn register(&self, job: Job, expression: &str) -> Result<(), HubError> {
        let schedule = Schedule::from_str(expression)
            .map_err(|e| HubError::InvalidCron(format!("{expression}: {e}")))?;

        self.remove(job);

        let event_tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            loop {
                let now = Local::now();
                let Some(next_time) = schedule.upcoming(Local).next() else {
                    tracing::warn!("No upcoming times for {:?} schedule", job);
                    break;
                };

                let duration = (next_time - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::from_secs(60));

                tracing::debug!("Next {:?} run at {} (in {:?})", job, next_time, duration);

                tokio::time::sleep(duration).await;

                tracing::debug!("Scheduled job {:?} fired", job);
                let _ = event_tx.send(SchedulerEvent { job });

                // Small delay to avoid double-firing
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        });

        self.timers.insert(job, handle);
        tracing::info!("Scheduled {:?} on '{}'", job, expression);
        Ok(())
    }

    /// Cancel a job's timer
    pub fn remove(&self, job: Job) {
        if let Some((_, handle)) = self.timers.remove(&job) {
            handle.abort();
            tracing::debug!("Removed scheduler timer for {:?}", job);
        }
    }

    /// Get the number of active timers
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Abort all timer tasks
        for entry in self.timers.iter() {
            entry.value().abort();
        }
    }
}
