use chrono::NaiveDate;
use tracing::warn;
use validator::Validate;

use madhumeh_mitra_data::models::{
    DailyLogRecord, FoodItemRecord, LoggedMealRecord, UserMetadataRecord, WorkoutRecord,
};

use crate::entities::nutrition::{DailyLog, FoodItem, LoggedMeal, MealSlot, Workout};
use crate::entities::profile::{ActivityLevel, BodyProfile, Gender, UserMetadata, UserProfile};
use crate::services::daily_log::recompute_totals;
use crate::services::metrics::compute_targets;

// Conversion functions between domain entities and data models
// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Parse a `YYYY-MM-DD` storage key into a calendar date
pub fn parse_date_key(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| format!("Invalid date key: {}", date))
}

/// Convert from data model to domain entity for a food item
pub fn convert_to_domain_food(record: FoodItemRecord) -> FoodItem {
    FoodItem {
        id: record.id,
        name: record.name,
        calories: record.calories,
        carbs: record.carbs,
        protein: record.protein,
        fat: record.fat,
    }
}

/// Convert from domain entity to data model for a food item
pub fn convert_to_data_food(item: &FoodItem) -> FoodItemRecord {
    FoodItemRecord {
        id: item.id.clone(),
        name: item.name.clone(),
        calories: item.calories,
        carbs: item.carbs,
        protein: item.protein,
        fat: item.fat,
    }
}

/// Convert a stored day into a domain log.
///
/// Totals are recomputed from the line items rather than trusted from storage.
pub fn convert_to_domain_log(record: DailyLogRecord) -> Result<DailyLog, String> {
    let date = parse_date_key(&record.date)?;

    let meals = record
        .meals
        .into_iter()
        .map(|meal| {
            Ok(LoggedMeal {
                slot: meal.time.parse::<MealSlot>()?,
                id: meal.id,
                name: meal.name,
                calories: meal.calories,
                carbs: meal.carbs,
                timestamp: meal.timestamp,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let workouts = record
        .workouts
        .into_iter()
        .map(|workout| Workout {
            id: workout.id,
            activity_type: workout.activity_type,
            duration_minutes: workout.duration_minutes,
            calories_burned: workout.calories_burned,
            timestamp: workout.timestamp,
        })
        .collect();

    let log = DailyLog {
        date,
        water_glasses: record.water_glasses,
        meals,
        workouts,
        total_calories_in: record.total_calories_in,
        total_carbs: record.total_carbs,
        total_calories_burned: record.total_calories_burned,
        ai_insight: record.ai_insight,
    };

    Ok(recompute_totals(log))
}

/// Convert a domain log into its stored shape
pub fn convert_to_data_log(log: &DailyLog) -> DailyLogRecord {
    DailyLogRecord {
        date: log.date_key(),
        water_glasses: log.water_glasses,
        meals: log
            .meals
            .iter()
            .map(|meal| LoggedMealRecord {
                id: meal.id.clone(),
                name: meal.name.clone(),
                calories: meal.calories,
                carbs: meal.carbs,
                time: meal.slot.to_string(),
                timestamp: meal.timestamp,
            })
            .collect(),
        workouts: log
            .workouts
            .iter()
            .map(|workout| WorkoutRecord {
                id: workout.id.clone(),
                activity_type: workout.activity_type.clone(),
                duration_minutes: workout.duration_minutes,
                calories_burned: workout.calories_burned,
                timestamp: workout.timestamp,
            })
            .collect(),
        total_calories_in: log.total_calories_in,
        total_carbs: log.total_carbs,
        total_calories_burned: log.total_calories_burned,
        ai_insight: log.ai_insight.clone(),
    }
}

/// Rebuild the body profile from stored fields, if all are present and valid
fn body_profile_from_record(record: &UserMetadataRecord) -> Option<BodyProfile> {
    let body = BodyProfile {
        age: record.age?,
        gender: record.gender.as_deref()?.parse::<Gender>().ok()?,
        height_cm: record.height?,
        weight_kg: record.weight?,
        activity_level: ActivityLevel::parse_or_default(record.activity_level.as_deref()?),
    };

    if !body.height_cm.is_finite() || !body.weight_kg.is_finite() {
        warn!("Stored body profile has non-finite metrics, ignoring it");
        return None;
    }

    match body.validate() {
        Ok(()) => Some(body),
        Err(e) => {
            warn!("Stored body profile failed validation, ignoring it: {}", e);
            None
        }
    }
}

/// Convert stored metadata into its typed domain view.
///
/// Targets are re-derived from the body metrics; the stored copies are only a cache.
pub fn convert_to_domain_metadata(record: UserMetadataRecord) -> UserMetadata {
    let profile = body_profile_from_record(&record).map(|body| UserProfile {
        targets: compute_targets(&body),
        body,
    });

    UserMetadata {
        onboarding_completed: record.onboarding_completed && profile.is_some(),
        profile,
        custom_foods: record
            .custom_foods
            .into_iter()
            .map(convert_to_domain_food)
            .collect(),
    }
}

/// Convert typed metadata into its stored shape.
///
/// The log mapping is left empty: stores keep their own logs on profile writes.
pub fn convert_to_data_metadata(metadata: &UserMetadata) -> UserMetadataRecord {
    let body = metadata.profile.as_ref().map(|p| &p.body);
    let targets = metadata.profile.as_ref().map(|p| &p.targets);

    UserMetadataRecord {
        onboarding_completed: metadata.onboarding_completed,
        age: body.map(|b| b.age),
        gender: body.map(|b| b.gender.as_str().to_string()),
        height: body.map(|b| b.height_cm),
        weight: body.map(|b| b.weight_kg),
        activity_level: body.map(|b| b.activity_level.as_str().to_string()),
        bmi: targets.map(|t| t.bmi),
        bmr: targets.map(|t| t.bmr),
        target_calories: targets.map(|t| t.target_calories),
        target_water: targets.map(|t| t.target_water),
        custom_foods: metadata.custom_foods.iter().map(convert_to_data_food).collect(),
        logs: Default::default(),
    }
}
