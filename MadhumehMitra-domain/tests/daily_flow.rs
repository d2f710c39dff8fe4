use std::sync::Arc;

use chrono::NaiveDate;
use madhumeh_mitra_data::database::open_in_memory_pool;
use madhumeh_mitra_data::repository::{DatabaseStorage, KeyValueStore};
use madhumeh_mitra_domain::auth::{select_session, AuthConfig, Session};
use madhumeh_mitra_domain::entities::{ActivityLevel, BodyProfile, Gender, MealSlot};
use madhumeh_mitra_domain::services::daily_log::summarize;
use madhumeh_mitra_domain::services::{
    build_week, DailyLogService, FoodCatalog, LogChange, PendingMeal, PersistOutcome, ProfileService,
};

// Initialize tracing once for all tests
static INIT: std::sync::Once = std::sync::Once::new();
fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    });
}

fn sqlite_local() -> Arc<dyn KeyValueStore> {
    let pool = open_in_memory_pool().unwrap();
    Arc::new(DatabaseStorage::new(pool))
}

async fn guest_session(local: &Arc<dyn KeyValueStore>) -> Session {
    select_session(&AuthConfig::default(), Arc::clone(local)).await
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[tokio::test]
async fn test_guest_day_survives_reload() {
    initialize();
    let local = sqlite_local();
    let session = guest_session(&local).await;
    let logs = DailyLogService::new(Arc::clone(&session.store), Arc::clone(&local), session.identity());

    let catalog = FoodCatalog::default();
    let mut pending = PendingMeal::new();
    for item in catalog.search("roti").into_iter().take(1) {
        pending.add(item.clone());
        pending.add(item);
    }
    pending.add(catalog.search("dal")[0].clone());

    let log = logs.load(date(5)).await;
    let (log, outcome) = logs
        .apply(
            log,
            LogChange::CommitMeals {
                items: pending.items().to_vec(),
                slot: MealSlot::Lunch,
            },
        )
        .await;
    pending.clear();
    assert_eq!(outcome, Some(PersistOutcome::Stored));

    let (log, _) = logs.apply(log, LogChange::AddWater).await;
    let (log, _) = logs.apply(log, LogChange::AddWater).await;
    let (log, _) = logs
        .apply(
            log,
            LogChange::AddWorkout {
                activity_id: "yoga".to_string(),
                duration_minutes: 20,
            },
        )
        .await;

    assert_eq!(log.meals.len(), 3);
    assert_eq!(log.total_calories_in, 100 + 100 + 150);
    assert_eq!(log.total_calories_burned, 60);

    // A fresh service over the same storage sees the same day
    let reopened = DailyLogService::new(Arc::clone(&session.store), Arc::clone(&local), session.identity());
    assert_eq!(reopened.load(date(5)).await, log);
}

#[tokio::test]
async fn test_onboarding_drives_summary_targets() {
    initialize();
    let local = sqlite_local();
    let session = guest_session(&local).await;
    let profiles = ProfileService::new(Arc::clone(&session.store), session.identity());
    let logs = DailyLogService::new(Arc::clone(&session.store), Arc::clone(&local), session.identity());

    let before = profiles.load().await;
    let log = logs.load(date(5)).await;
    assert_eq!(summarize(&log, &before).calorie_target, 1800);

    let body = BodyProfile {
        age: 35,
        gender: Gender::Male,
        height_cm: 170.0,
        weight_kg: 70.0,
        activity_level: ActivityLevel::Light,
    };
    profiles.onboard(&before, body).await.unwrap();

    let after = profiles.load().await;
    let summary = summarize(&log, &after);
    assert_eq!(summary.calorie_target, 2190);
    assert_eq!(summary.water_target, 10);
}

#[tokio::test]
async fn test_week_view_from_sqlite() {
    initialize();
    let local = sqlite_local();
    let session = guest_session(&local).await;
    let logs = DailyLogService::new(Arc::clone(&session.store), Arc::clone(&local), session.identity());

    for day in [1, 3] {
        let log = logs.load(date(day)).await;
        logs.apply(log, LogChange::AddWater).await;
    }
    // Workouts alone do not make a day show up in history
    let log = logs.load(date(4)).await;
    logs.apply(
        log,
        LogChange::AddWorkout {
            activity_id: "run".to_string(),
            duration_minutes: 15,
        },
    )
    .await;

    let week = build_week(session.store.as_ref(), &session.identity(), date(6)).await;
    let dates: Vec<String> = week.iter().map(|log| log.date_key()).collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-03-03", "2024-03-06"]);
}
