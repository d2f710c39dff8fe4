use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::entities::conversions;
use crate::entities::{DailyLog, FoodItem, LoggedMeal, MealSlot, UserMetadata, Workout};
use crate::services::activities::find_activity;
use madhumeh_mitra_data::models::{DailyLogRecord, Identity};
use madhumeh_mitra_data::repository::{KeyValueStore, LogStoreTrait};

/// Key prefix for the local safety copy of a day that failed to persist
pub const BACKUP_KEY_PREFIX: &str = "backup_log_";

pub fn backup_key(date: NaiveDate) -> String {
    format!("{}{}", BACKUP_KEY_PREFIX, date.format("%Y-%m-%d"))
}

/// Round a macro value onto a whole, non-negative number
fn to_whole(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// An empty log for `date`
pub fn create_empty(date: NaiveDate) -> DailyLog {
    DailyLog {
        date,
        water_glasses: 0,
        meals: Vec::new(),
        workouts: Vec::new(),
        total_calories_in: 0,
        total_carbs: 0,
        total_calories_burned: 0,
        ai_insight: None,
    }
}

pub fn add_water(mut log: DailyLog) -> DailyLog {
    log.water_glasses = log.water_glasses.saturating_add(1);
    log
}

/// Remove a glass; at zero this is a no-op.
pub fn remove_water(mut log: DailyLog) -> DailyLog {
    log.water_glasses = log.water_glasses.saturating_sub(1);
    log
}

/// Append every pending item as a meal in `slot`, then recompute totals.
///
/// An empty selection returns the log unchanged.
pub fn commit_meals(mut log: DailyLog, pending: &[FoodItem], slot: MealSlot, now_ms: i64) -> DailyLog {
    if pending.is_empty() {
        debug!("No pending items to commit for {}", slot);
        return log;
    }

    log.meals.extend(pending.iter().map(|item| LoggedMeal {
        id: Uuid::new_v4().to_string(),
        name: item.name.clone(),
        calories: to_whole(item.calories),
        carbs: to_whole(item.carbs),
        slot,
        timestamp: now_ms,
    }));

    recompute_totals(log)
}

/// Append a workout. Burned calories are truncated to whole calories.
///
/// A zero-minute workout is ignored.
pub fn add_workout(
    mut log: DailyLog,
    activity_type: &str,
    calories_per_minute: f64,
    duration_minutes: u32,
    now_ms: i64,
) -> DailyLog {
    if duration_minutes == 0 {
        warn!("Ignoring zero-minute {} workout", activity_type);
        return log;
    }

    let burned = f64::from(duration_minutes) * calories_per_minute;
    let calories_burned = if burned.is_finite() && burned > 0.0 {
        burned.trunc() as u32
    } else {
        0
    };

    log.workouts.push(Workout {
        id: Uuid::new_v4().to_string(),
        activity_type: activity_type.to_string(),
        duration_minutes,
        calories_burned,
        timestamp: now_ms,
    });

    recompute_totals(log)
}

/// Re-derive the three totals from the line items
pub fn recompute_totals(mut log: DailyLog) -> DailyLog {
    log.total_calories_in = log
        .meals
        .iter()
        .fold(0u32, |acc, meal| acc.saturating_add(meal.calories));
    log.total_carbs = log
        .meals
        .iter()
        .fold(0u32, |acc, meal| acc.saturating_add(meal.carbs));
    log.total_calories_burned = log
        .workouts
        .iter()
        .fold(0u32, |acc, workout| acc.saturating_add(workout.calories_burned));
    log
}

/// Meals already logged in `slot`, in the order they were added
pub fn meals_for_slot(log: &DailyLog, slot: MealSlot) -> Vec<&LoggedMeal> {
    log.meals.iter().filter(|meal| meal.slot == slot).collect()
}

/// Catalog items picked for the next commit. The same item may be picked more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingMeal {
    items: Vec<FoodItem>,
}

impl PendingMeal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    /// Remove one occurrence of the item with `id`
    pub fn remove_one(&mut self, id: &str) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, id: &str) -> usize {
        self.items.iter().filter(|item| item.id == id).count()
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// A day's totals measured against the user's targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub calories_in: u32,
    pub calorie_target: u32,
    /// Percentage of the calorie target, capped at 100
    pub calorie_progress: f64,
    pub calories_burned: u32,
    /// Calories in minus calories burned
    pub net_calories: i64,
    pub carbs: u32,
    pub water_glasses: u32,
    pub water_target: u32,
    /// Percentage of the water target, capped at 100
    pub water_progress: f64,
}

fn progress_percent(value: u32, target: u32) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (f64::from(value) / f64::from(target) * 100.0).min(100.0)
}

pub fn summarize(log: &DailyLog, metadata: &UserMetadata) -> DailySummary {
    let calorie_target = metadata.calorie_target();
    let water_target = metadata.water_target();

    DailySummary {
        date: log.date,
        calories_in: log.total_calories_in,
        calorie_target,
        calorie_progress: progress_percent(log.total_calories_in, calorie_target),
        calories_burned: log.total_calories_burned,
        net_calories: i64::from(log.total_calories_in) - i64::from(log.total_calories_burned),
        carbs: log.total_carbs,
        water_glasses: log.water_glasses,
        water_target,
        water_progress: progress_percent(log.water_glasses, water_target),
    }
}

/// What happened to a log write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Written to the primary store
    Stored,
    /// Primary store failed; the local backup holds the log
    BackedUp,
    /// Both writes failed; only the in-memory log has the change
    Unsaved,
}

/// A single user action against a day's log
#[derive(Debug, Clone, PartialEq)]
pub enum LogChange {
    AddWater,
    RemoveWater,
    CommitMeals { items: Vec<FoodItem>, slot: MealSlot },
    AddWorkout { activity_id: String, duration_minutes: u32 },
    SetInsight(String),
}

/// Applies user actions to a day's log and persists the result.
///
/// The log returned from every call is authoritative for the session
/// regardless of whether the write succeeded.
pub struct DailyLogService {
    store: Arc<dyn LogStoreTrait>,
    backup: Arc<dyn KeyValueStore>,
    identity: Identity,
}

impl DailyLogService {
    pub fn new(store: Arc<dyn LogStoreTrait>, backup: Arc<dyn KeyValueStore>, identity: Identity) -> Self {
        Self {
            store,
            backup,
            identity,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn store(&self) -> Arc<dyn LogStoreTrait> {
        Arc::clone(&self.store)
    }

    /// Load the log for `date`, creating an empty one if nothing is stored.
    ///
    /// A failed read falls back to the local backup, then to an empty log.
    pub async fn load(&self, date: NaiveDate) -> DailyLog {
        let key = date.format("%Y-%m-%d").to_string();

        match self.store.get_log(&self.identity, &key).await {
            Ok(Some(record)) => decode_or_empty(record, date),
            Ok(None) => create_empty(date),
            Err(e) => {
                warn!("Failed to read log {} for {}: {}", key, self.identity, e);
                self.load_backup(date).await.unwrap_or_else(|| create_empty(date))
            }
        }
    }

    async fn load_backup(&self, date: NaiveDate) -> Option<DailyLog> {
        let raw = match self.backup.get(&backup_key(date)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read backup for {}: {}", date, e);
                return None;
            }
        };

        match serde_json::from_str::<DailyLogRecord>(&raw) {
            Ok(record) => {
                info!("Recovered log {} from local backup", date);
                Some(decode_or_empty(record, date))
            }
            Err(e) => {
                warn!("Discarding corrupt backup for {}: {}", date, e);
                None
            }
        }
    }

    /// Persist `log`, recomputing its totals first.
    ///
    /// A successful primary write drops any backup left for that date.
    pub async fn save(&self, log: &DailyLog) -> PersistOutcome {
        let log = recompute_totals(log.clone());
        let record = conversions::convert_to_data_log(&log);

        let primary_error = match self.store.put_log(&self.identity, &record).await {
            Ok(()) => {
                debug!("Stored log {} for {}", record.date, self.identity);
                if let Err(e) = self.backup.remove(&backup_key(log.date)).await {
                    warn!("Failed to clear stale backup for {}: {}", record.date, e);
                }
                return PersistOutcome::Stored;
            }
            Err(e) => e,
        };
        error!(
            "Failed to store log {} for {}: {}",
            record.date, self.identity, primary_error
        );

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize backup for {}: {}", record.date, e);
                return PersistOutcome::Unsaved;
            }
        };

        match self.backup.put(&backup_key(log.date), &json).await {
            Ok(()) => {
                warn!("Log {} kept in local backup", record.date);
                PersistOutcome::BackedUp
            }
            Err(e) => {
                error!("Failed to write backup for {}: {}", record.date, e);
                PersistOutcome::Unsaved
            }
        }
    }

    /// Apply `change` to `log` and persist it if anything changed
    pub async fn apply(&self, log: DailyLog, change: LogChange) -> (DailyLog, Option<PersistOutcome>) {
        let now_ms = Utc::now().timestamp_millis();
        let before = log.clone();

        let updated = match change {
            LogChange::AddWater => add_water(log),
            LogChange::RemoveWater => remove_water(log),
            LogChange::CommitMeals { items, slot } => commit_meals(log, &items, slot, now_ms),
            LogChange::AddWorkout {
                activity_id,
                duration_minutes,
            } => {
                let activity = find_activity(&activity_id);
                add_workout(
                    log,
                    activity.name,
                    activity.calories_per_minute,
                    duration_minutes,
                    now_ms,
                )
            }
            LogChange::SetInsight(insight) => DailyLog {
                ai_insight: Some(insight),
                ..log
            },
        };

        if updated == before {
            return (updated, None);
        }

        let outcome = self.save(&updated).await;
        (updated, Some(outcome))
    }
}

fn decode_or_empty(record: DailyLogRecord, date: NaiveDate) -> DailyLog {
    match conversions::convert_to_domain_log(record) {
        Ok(log) => log,
        Err(e) => {
            warn!("Stored log for {} is unreadable, starting empty: {}", date, e);
            create_empty(date)
        }
    }
}
