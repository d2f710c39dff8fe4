use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::conversions::convert_to_domain_log;
use crate::entities::DailyLog;
use crate::services::daily_log::create_empty;
use madhumeh_mitra_data::models::Identity;
use madhumeh_mitra_data::repository::LogStoreTrait;

/// Number of days in the history view, today included
pub const HISTORY_WINDOW_DAYS: u64 = 7;

/// Fetch one day, treating any failure as an empty day
async fn fetch_day(store: &dyn LogStoreTrait, identity: &Identity, date: NaiveDate) -> DailyLog {
    let key = date.format("%Y-%m-%d").to_string();

    match store.get_log(identity, &key).await {
        Ok(Some(record)) => convert_to_domain_log(record).unwrap_or_else(|e| {
            warn!("Skipping unreadable log {}: {}", key, e);
            create_empty(date)
        }),
        Ok(None) => create_empty(date),
        Err(e) => {
            warn!("Failed to read log {} for history: {}", key, e);
            create_empty(date)
        }
    }
}

/// The last seven days ending at `today`, oldest first.
///
/// Past days without calories or water are left out; today is always present.
pub async fn build_week(store: &dyn LogStoreTrait, identity: &Identity, today: NaiveDate) -> Vec<DailyLog> {
    let mut week = Vec::with_capacity(HISTORY_WINDOW_DAYS as usize);

    for days_ago in (0..HISTORY_WINDOW_DAYS).rev() {
        let Some(date) = today.checked_sub_days(Days::new(days_ago)) else {
            continue;
        };

        let log = fetch_day(store, identity, date).await;
        if days_ago == 0 || log.has_data() {
            week.push(log);
        }
    }

    week
}

/// One bar group in the weekly chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Short weekday name, e.g. "Mon"
    pub label: String,
    pub calories_in: u32,
    pub calories_burned: u32,
    /// Water glasses ×10 so it shares an axis with calories
    pub water_scaled: u32,
}

pub fn chart_points(week: &[DailyLog]) -> Vec<ChartPoint> {
    week.iter()
        .map(|log| ChartPoint {
            label: log.date.format("%a").to_string(),
            calories_in: log.total_calories_in,
            calories_burned: log.total_calories_burned,
            water_scaled: log.water_glasses.saturating_mul(10),
        })
        .collect()
}
