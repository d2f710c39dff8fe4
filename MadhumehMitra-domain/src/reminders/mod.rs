// Hydration and activity reminders
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::time;
use tracing::{debug, info, warn};

use madhumeh_mitra_data::models::LocalPreferencesRecord;
use madhumeh_mitra_data::repository::{KeyValueStore, PreferencesRepository};

pub const REMINDER_TITLE: &str = "Madhumeh Mitra";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_WATER_INTERVAL: Duration = Duration::from_secs(90 * 60);
pub const DEFAULT_ACTIVITY_INTERVAL: Duration = Duration::from_secs(120 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderCategory {
    Hydration,
    Activity,
}

impl ReminderCategory {
    pub fn body(&self) -> &'static str {
        match self {
            ReminderCategory::Hydration => "Remember to Drink water!",
            ReminderCategory::Activity => "Go for a walk or do some activity!",
        }
    }
}

impl fmt::Display for ReminderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderCategory::Hydration => f.write_str("hydration"),
            ReminderCategory::Activity => f.write_str("activity"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifications are not supported here")]
    Unsupported,

    #[error("Failed to deliver notification: {0}")]
    Delivery(String),
}

/// Somewhere reminders can be shown
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, category: ReminderCategory, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Shows reminders as log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, category: ReminderCategory, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(category = %category, "{}: {}", title, body);
        Ok(())
    }
}

/// Fires each reminder category at most once per interval.
///
/// Last-fired times live in the local preferences record so they survive restarts.
pub struct ReminderScheduler {
    preferences: PreferencesRepository<Arc<dyn KeyValueStore>>,
    notifier: Arc<dyn Notifier>,
    water_interval: Duration,
    activity_interval: Duration,
}

/// `now - last > interval`, with all values in epoch milliseconds
fn is_due(now_ms: i64, last_ms: i64, interval: Duration) -> bool {
    let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(last_ms) > interval_ms
}

impl ReminderScheduler {
    pub fn new(local: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            preferences: PreferencesRepository::new(local),
            notifier,
            water_interval: DEFAULT_WATER_INTERVAL,
            activity_interval: DEFAULT_ACTIVITY_INTERVAL,
        }
    }

    pub fn with_intervals(mut self, water: Duration, activity: Duration) -> Self {
        self.water_interval = water;
        self.activity_interval = activity;
        self
    }

    async fn show(&self, category: ReminderCategory) {
        if let Err(e) = self.notifier.notify(category, REMINDER_TITLE, category.body()).await {
            warn!("Skipped {} reminder: {}", category, e);
        }
    }

    /// Fire whatever is due at `now_ms` and return the categories that fired
    pub async fn check(&self, now_ms: i64) -> Vec<ReminderCategory> {
        let mut prefs = match self.preferences.load().await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Failed to load reminder state, using defaults: {}", e);
                LocalPreferencesRecord::default()
            }
        };

        let mut fired = Vec::new();

        if is_due(now_ms, prefs.last_water_notif_at, self.water_interval) {
            self.show(ReminderCategory::Hydration).await;
            prefs.last_water_notif_at = now_ms;
            fired.push(ReminderCategory::Hydration);
        }

        if is_due(now_ms, prefs.last_activity_notif_at, self.activity_interval) {
            self.show(ReminderCategory::Activity).await;
            prefs.last_activity_notif_at = now_ms;
            fired.push(ReminderCategory::Activity);
        }

        if !fired.is_empty() {
            if let Err(e) = self.preferences.save(&prefs).await {
                warn!("Failed to save reminder state: {}", e);
            }
        }

        fired
    }

    /// Check immediately, then every `poll`, until `shutdown` completes
    pub async fn run_until<F>(&self, poll: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval(poll);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let fired = self.check(Utc::now().timestamp_millis()).await;
                    debug!("Reminder check fired {:?}", fired);
                }
                _ = &mut shutdown => {
                    info!("Reminder loop stopped");
                    break;
                }
            }
        }
    }
}
