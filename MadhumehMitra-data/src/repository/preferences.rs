use tracing::warn;

use crate::models::LocalPreferencesRecord;
use super::errors::RepositoryError;
use super::kv::KeyValueStore;

const PREFERENCES_KEY: &str = "local_preferences";

/// Loads and saves the device-local preferences record
#[derive(Debug, Clone)]
pub struct PreferencesRepository<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> PreferencesRepository<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Load preferences; a missing or unreadable record yields the defaults
    pub async fn load(&self) -> Result<LocalPreferencesRecord, RepositoryError> {
        let Some(raw) = self.kv.get(PREFERENCES_KEY).await? else {
            return Ok(LocalPreferencesRecord::default());
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!("Discarding unreadable local preferences: {}", e);
                Ok(LocalPreferencesRecord::default())
            }
        }
    }

    pub async fn save(&self, record: &LocalPreferencesRecord) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(record)?;
        self.kv.put(PREFERENCES_KEY, &raw).await
    }
}
