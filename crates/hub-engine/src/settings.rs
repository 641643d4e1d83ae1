//! Single-record settings store

use crate::model::Settings;
use crate::window::LightWindow;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Holds at most one settings record; every write replaces it wholesale
#[derive(Default)]
pub struct SettingsStore {
    current: RwLock<Option<Settings>>,
}

impl SettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored settings, returning whether a previous record existed
    pub async fn replace(&self, settings: Settings) -> bool {
        self.current.write().await.replace(settings).is_some()
    }

    /// Snapshot of the active settings
    pub async fn get(&self) -> Option<Settings> {
        self.current.read().await.clone()
    }

    /// Rewrite the light window of the record with the given id.
    ///
    /// Returns the updated record, or `None` when the store is empty or now
    /// holds a different record.
    pub async fn update_window(&self, id: Uuid, window: LightWindow) -> Option<Settings> {
        let mut current = self.current.write().await;
        let settings = current.as_mut().filter(|s| s.id == id)?;
        settings.window = window;
        Some(settings.clone())
    }
}
