//! Core hub service

use crate::config::HubConfig;
use crate::decision::decide;
use crate::duration::{parse_duration, parse_time_of_day};
use crate::error::HubError;
use crate::history::ReadingHistory;
use crate::model::{AppliedSettings, Command, Reading, Settings, SettingsRequest};
use crate::scheduler::{Job, Scheduler};
use crate::settings::SettingsStore;
use crate::sunset::{SunsetLookup, SunsetResolver};
use crate::window::LightWindow;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Owns all hub state: settings, reading history, sunset memo and the
/// maintenance scheduler
pub struct SmartHub<L> {
    config: HubConfig,
    settings: SettingsStore,
    history: ReadingHistory,
    sunset: SunsetResolver<L>,
    scheduler: Scheduler,
}

impl<L: SunsetLookup> SmartHub<L> {
    /// Create a hub that resolves sunsets through `lookup`
    pub fn new(config: HubConfig, lookup: L) -> Self {
        let sunset = SunsetResolver::new(lookup, config.fallback_sunset);
        Self {
            config,
            settings: SettingsStore::new(),
            history: ReadingHistory::new(),
            sunset,
            scheduler: Scheduler::new(),
        }
    }

    /// Register the daily jobs and start handling them
    pub fn start(self: &Arc<Self>) -> Result<(), HubError> {
        self.scheduler
            .register(Job::PurgeSunsetCache, &self.config.purge_schedule)?;
        self.scheduler
            .register(Job::RefreshSunset, &self.config.refresh_schedule)?;
        self.start_scheduler_listener();
        Ok(())
    }

    /// Replace the settings with a new record built from `request`
    pub async fn apply_settings(
        &self,
        request: SettingsRequest,
    ) -> Result<AppliedSettings, HubError> {
        let from_sunset = request.wants_sunset();
        let light_on = if from_sunset {
            let (lat, lng) = match (request.lat, request.lng) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => (
                    self.config.default_location.lat,
                    self.config.default_location.lng,
                ),
            };
            self.sunset.resolve(lat, lng).await
        } else {
            parse_time_of_day(&request.user_light)?
        };

        let light_duration = parse_duration(&request.light_duration)?;

        let settings = Settings {
            id: request.id.unwrap_or_else(Uuid::new_v4),
            target_temp: request.user_temp,
            window: LightWindow::starting_at(light_on, light_duration),
            light_duration,
            from_sunset,
        };

        let replaced = self.settings.replace(settings.clone()).await;
        tracing::info!(
            "{} settings {}: target {}, light {} to {}{}",
            if replaced { "Updated" } else { "Created" },
            settings.id,
            settings.target_temp,
            settings.window.on,
            settings.window.off,
            if from_sunset { " (sunset)" } else { "" }
        );

        Ok(AppliedSettings {
            settings,
            created: !replaced,
        })
    }

    /// The active settings
    pub async fn current_settings(&self) -> Result<Settings, HubError> {
        self.settings.get().await.ok_or(HubError::NoSettings)
    }

    /// Record a reading and decide the fan and light state for it
    pub async fn ingest(&self, reading: Reading) -> Command {
        self.history.push(reading.clone()).await;
        let settings = self.settings.get().await;
        let command = decide(settings.as_ref(), &reading);
        tracing::debug!(
            "Reading {:.2} (presence: {}) -> fan {:?}, light {:?}",
            reading.temperature,
            reading.presence,
            command.fan,
            command.light
        );
        command
    }

    /// Up to `count` most recent readings, newest first
    pub async fn recent_readings(&self, count: usize) -> Result<Vec<Reading>, HubError> {
        self.history.latest(count).await
    }

    /// Drop sunset cache entries from previous days
    pub fn purge_sunset_cache(&self) -> usize {
        self.purge_sunset_cache_on(Local::now().date_naive())
    }

    fn purge_sunset_cache_on(&self, today: NaiveDate) -> usize {
        let removed = self.sunset.purge_stale(today);
        tracing::info!("Purged {} stale sunset cache entries", removed);
        removed
    }

    /// Move a sunset-derived light window to today's sunset.
    ///
    /// The stored light duration is carried forward. Returns the updated
    /// settings, or `None` when there was nothing to refresh.
    pub async fn refresh_sunset(&self) -> Option<Settings> {
        self.refresh_sunset_on(Local::now().date_naive()).await
    }

    async fn refresh_sunset_on(&self, today: NaiveDate) -> Option<Settings> {
        let Some(current) = self.settings.get().await else {
            tracing::debug!("No settings, skipping sunset refresh");
            return None;
        };
        if !current.from_sunset {
            tracing::debug!("Settings {} use a fixed light time, skipping sunset refresh", current.id);
            return None;
        }

        let location = self.config.default_location;
        let sunset = self.sunset.resolve_on(location.lat, location.lng, today).await;
        let window = LightWindow::starting_at(sunset, current.light_duration);

        match self.settings.update_window(current.id, window).await {
            Some(updated) => {
                tracing::info!(
                    "Refreshed sunset window for {}: {} to {}",
                    updated.id,
                    updated.window.on,
                    updated.window.off
                );
                Some(updated)
            }
            None => {
                tracing::warn!(
                    "Settings {} were replaced during sunset refresh, leaving new settings untouched",
                    current.id
                );
                None
            }
        }
    }

    /// Start listening for scheduler events
    fn start_scheduler_listener(self: &Arc<Self>) {
        let hub = Arc::clone(self);
        let mut rx = self.scheduler.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => match event.job {
                        Job::PurgeSunsetCache => {
                            hub.purge_sunset_cache();
                        }
                        Job::RefreshSunset => {
                            hub.refresh_sunset().await;
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Scheduler listener lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Scheduler event channel closed");
                        break;
                    }
                }
            }
        });
    }
}
