use async_trait::async_trait;
use tracing::{debug, info};

use crate::models::{DailyLogRecord, Identity, UserMetadataRecord};
use super::errors::RepositoryError;
use super::kv::KeyValueStore;
use super::retention::{insert_with_retention, MAX_STORED_LOGS};

const GUEST_LOG_PREFIX: &str = "guest_log_";
const GUEST_PROFILE_KEY: &str = "guest_profile";
const PROFILE_PREFIX: &str = "profile_";

/// Store for daily logs and profile metadata, addressed by identity and date
#[async_trait]
pub trait LogStoreTrait: Send + Sync {
    /// Get the stored log for `date`, if any
    async fn get_log(&self, identity: &Identity, date: &str) -> Result<Option<DailyLogRecord>, RepositoryError>;

    /// Store `log` under its own date, replacing any previous log for that date
    async fn put_log(&self, identity: &Identity, log: &DailyLogRecord) -> Result<(), RepositoryError>;

    /// Get the profile metadata for `identity`, if any
    async fn get_profile(&self, identity: &Identity) -> Result<Option<UserMetadataRecord>, RepositoryError>;

    /// Store profile metadata for `identity`
    async fn put_profile(&self, identity: &Identity, metadata: &UserMetadataRecord) -> Result<(), RepositoryError>;
}

async fn read_json<K, T>(kv: &K, key: &str) -> Result<Option<T>, RepositoryError>
where
    K: KeyValueStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    match kv.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn write_json<K, T>(kv: &K, key: &str, value: &T) -> Result<(), RepositoryError>
where
    K: KeyValueStore + ?Sized,
    T: serde::Serialize,
{
    let raw = serde_json::to_string(value)?;
    kv.put(key, &raw).await
}

/// Local store for unauthenticated use.
///
/// Logs are keyed by date only; the identity argument is ignored.
#[derive(Debug, Clone)]
pub struct GuestLogStore<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> GuestLogStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    fn log_key(date: &str) -> String {
        format!("{}{}", GUEST_LOG_PREFIX, date)
    }
}

#[async_trait]
impl<K: KeyValueStore> LogStoreTrait for GuestLogStore<K> {
    async fn get_log(&self, _identity: &Identity, date: &str) -> Result<Option<DailyLogRecord>, RepositoryError> {
        read_json(&self.kv, &Self::log_key(date)).await
    }

    async fn put_log(&self, _identity: &Identity, log: &DailyLogRecord) -> Result<(), RepositoryError> {
        debug!("Storing guest log for {}", log.date);
        write_json(&self.kv, &Self::log_key(&log.date), log).await
    }

    async fn get_profile(&self, _identity: &Identity) -> Result<Option<UserMetadataRecord>, RepositoryError> {
        read_json(&self.kv, GUEST_PROFILE_KEY).await
    }

    async fn put_profile(&self, _identity: &Identity, metadata: &UserMetadataRecord) -> Result<(), RepositoryError> {
        write_json(&self.kv, GUEST_PROFILE_KEY, metadata).await
    }
}

/// Store for signed-in users, where the daily logs live inside the profile metadata.
///
/// The date-to-log mapping is capped at [`MAX_STORED_LOGS`] entries on write.
#[derive(Debug, Clone)]
pub struct ProfileLogStore<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> ProfileLogStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    fn profile_key(identity: &Identity) -> Result<String, RepositoryError> {
        match identity {
            Identity::User(id) => Ok(format!("{}{}", PROFILE_PREFIX, id)),
            Identity::Guest => Err(RepositoryError::Validation(
                "profile store requires a signed-in identity".to_string(),
            )),
        }
    }
}

#[async_trait]
impl<K: KeyValueStore> LogStoreTrait for ProfileLogStore<K> {
    async fn get_log(&self, identity: &Identity, date: &str) -> Result<Option<DailyLogRecord>, RepositoryError> {
        let profile = self.get_profile(identity).await?;
        Ok(profile.and_then(|mut meta| meta.logs.remove(date)))
    }

    async fn put_log(&self, identity: &Identity, log: &DailyLogRecord) -> Result<(), RepositoryError> {
        let key = Self::profile_key(identity)?;
        let mut meta: UserMetadataRecord = read_json(&self.kv, &key).await?.unwrap_or_default();

        let evicted = insert_with_retention(&mut meta.logs, log.clone(), MAX_STORED_LOGS);
        if !evicted.is_empty() {
            info!("Retention evicted {} old log(s) for {}: {:?}", evicted.len(), identity, evicted);
        }

        debug!("Storing log for {} on {}", identity, log.date);
        write_json(&self.kv, &key, &meta).await
    }

    async fn get_profile(&self, identity: &Identity) -> Result<Option<UserMetadataRecord>, RepositoryError> {
        let key = Self::profile_key(identity)?;
        read_json(&self.kv, &key).await
    }

    /// Replace the profile fields; the stored log mapping is owned by `put_log` and kept as is
    async fn put_profile(&self, identity: &Identity, metadata: &UserMetadataRecord) -> Result<(), RepositoryError> {
        let key = Self::profile_key(identity)?;
        let existing: Option<UserMetadataRecord> = read_json(&self.kv, &key).await?;

        let mut updated = metadata.clone();
        updated.logs = existing.map(|meta| meta.logs).unwrap_or_default();

        write_json(&self.kv, &key, &updated).await
    }
}

/// Mock log store for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store that can be told to fail reads or writes
    #[derive(Default)]
    pub struct MockLogStore {
        logs: Mutex<HashMap<(Identity, String), DailyLogRecord>>,
        profiles: Mutex<HashMap<Identity, UserMetadataRecord>>,
        fail_reads: bool,
        fail_writes: bool,
        write_count: Mutex<usize>,
    }

    impl MockLogStore {
        /// Create a new empty mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure the mock to fail every read
        pub fn with_read_failure(mut self) -> Self {
            self.fail_reads = true;
            self
        }

        /// Configure the mock to fail every write
        pub fn with_write_failure(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        /// Seed a stored log
        pub fn with_log(self, identity: Identity, log: DailyLogRecord) -> Self {
            self.logs
                .lock()
                .unwrap()
                .insert((identity, log.date.clone()), log);
            self
        }

        /// Seed a stored profile
        pub fn with_profile(self, identity: Identity, metadata: UserMetadataRecord) -> Self {
            self.profiles.lock().unwrap().insert(identity, metadata);
            self
        }

        /// Number of successful log and profile writes
        pub fn write_count(&self) -> usize {
            *self.write_count.lock().unwrap()
        }

        fn check_read(&self) -> Result<(), RepositoryError> {
            if self.fail_reads {
                Err(RepositoryError::Unavailable("mock is configured to fail reads".to_string()))
            } else {
                Ok(())
            }
        }

        fn check_write(&self) -> Result<(), RepositoryError> {
            if self.fail_writes {
                Err(RepositoryError::Unavailable("mock is configured to fail writes".to_string()))
            } else {
                *self.write_count.lock().unwrap() += 1;
                Ok(())
            }
        }
    }

    #[async_trait]
    impl LogStoreTrait for MockLogStore {
        async fn get_log(&self, identity: &Identity, date: &str) -> Result<Option<DailyLogRecord>, RepositoryError> {
            self.check_read()?;
            let logs = self.logs.lock()?;
            Ok(logs.get(&(identity.clone(), date.to_string())).cloned())
        }

        async fn put_log(&self, identity: &Identity, log: &DailyLogRecord) -> Result<(), RepositoryError> {
            self.check_write()?;
            let mut logs = self.logs.lock()?;
            logs.insert((identity.clone(), log.date.clone()), log.clone());
            Ok(())
        }

        async fn get_profile(&self, identity: &Identity) -> Result<Option<UserMetadataRecord>, RepositoryError> {
            self.check_read()?;
            let profiles = self.profiles.lock()?;
            Ok(profiles.get(identity).cloned())
        }

        async fn put_profile(&self, identity: &Identity, metadata: &UserMetadataRecord) -> Result<(), RepositoryError> {
            self.check_write()?;
            let mut profiles = self.profiles.lock()?;
            profiles.insert(identity.clone(), metadata.clone());
            Ok(())
        }
    }

}
