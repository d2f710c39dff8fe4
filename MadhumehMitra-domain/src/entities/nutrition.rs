use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A food with its nutrition facts per serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Unique within a catalog; `ai_` prefix marks an AI estimate
    pub id: String,

    /// Display name, e.g. "Dal (1 Katori)"
    pub name: String,

    /// Energy in kcal
    pub calories: f64,

    /// Carbohydrates in grams
    pub carbs: f64,

    /// Protein in grams
    pub protein: f64,

    /// Fat in grams
    pub fat: f64,
}

impl FoodItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        calories: f64,
        carbs: f64,
        protein: f64,
        fat: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calories,
            carbs,
            protein,
            fat,
        }
    }
}

/// Meal slot used to bucket a day's meals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    /// All slots in the order a day runs through them
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Snack,
        MealSlot::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Snack => "Snack",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown meal slot: {}", s))
    }
}

/// A food committed to a day's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedMeal {
    pub id: String,
    pub name: String,
    pub calories: u32,
    pub carbs: u32,
    pub slot: MealSlot,

    /// Epoch milliseconds at commit
    pub timestamp: i64,
}

/// A workout committed to a day's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,

    /// Activity label, e.g. "Walk"
    pub activity_type: String,

    pub duration_minutes: u32,

    /// Frozen at creation: duration x kcal per minute, truncated
    pub calories_burned: u32,

    /// Epoch milliseconds at commit
    pub timestamp: i64,
}

/// Everything logged for one local calendar day.
///
/// The three totals are derived from `meals` and `workouts`; every mutation in
/// `services::daily_log` recomputes them before returning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub water_glasses: u32,
    pub meals: Vec<LoggedMeal>,
    pub workouts: Vec<Workout>,
    pub total_calories_in: u32,
    pub total_carbs: u32,
    pub total_calories_burned: u32,
    pub ai_insight: Option<String>,
}

impl DailyLog {
    /// Whether anything worth showing in history was logged
    pub fn has_data(&self) -> bool {
        self.total_calories_in > 0 || self.water_glasses > 0
    }

    /// The `YYYY-MM-DD` key this log is stored under
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
