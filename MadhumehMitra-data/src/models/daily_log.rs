use serde::{Deserialize, Serialize};

/// Storage model for a food item (catalog entry or AI estimate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItemRecord {
    /// Unique identifier within a catalog
    pub id: String,

    /// Display name, also the dedup key for custom foods
    pub name: String,

    /// Energy per serving in kcal
    pub calories: f64,

    /// Carbohydrates per serving in grams
    pub carbs: f64,

    /// Protein per serving in grams
    #[serde(default)]
    pub protein: f64,

    /// Fat per serving in grams
    #[serde(default)]
    pub fat: f64,
}

/// Storage model for a meal committed to a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMealRecord {
    pub id: String,
    pub name: String,
    pub calories: u32,
    pub carbs: u32,

    /// Meal slot label (Breakfast, Lunch, Snack, Dinner)
    pub time: String,

    /// Epoch milliseconds at commit
    pub timestamp: i64,
}

/// Storage model for a workout committed to a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,

    /// Activity label, e.g. "Walk"
    #[serde(rename = "type")]
    pub activity_type: String,

    pub duration_minutes: u32,
    pub calories_burned: u32,

    /// Epoch milliseconds at commit
    pub timestamp: i64,
}

/// Storage model for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogRecord {
    /// Local calendar day, `YYYY-MM-DD`
    pub date: String,

    #[serde(default)]
    pub water_glasses: u32,

    #[serde(default)]
    pub meals: Vec<LoggedMealRecord>,

    #[serde(default)]
    pub workouts: Vec<WorkoutRecord>,

    #[serde(default)]
    pub total_calories_in: u32,

    #[serde(default)]
    pub total_carbs: u32,

    #[serde(default)]
    pub total_calories_burned: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insight: Option<String>,
}

impl DailyLogRecord {
    /// An empty record for the given date
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            water_glasses: 0,
            meals: Vec::new(),
            workouts: Vec::new(),
            total_calories_in: 0,
            total_carbs: 0,
            total_calories_burned: 0,
            ai_insight: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_camel_case_keys() {
        let mut record = DailyLogRecord::empty("2024-03-01");
        record.workouts.push(WorkoutRecord {
            id: "w1".to_string(),
            activity_type: "Walk".to_string(),
            duration_minutes: 30,
            calories_burned: 120,
            timestamp: 1_709_280_000_000,
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["waterGlasses"], 0);
        assert_eq!(json["totalCaloriesIn"], 0);
        assert_eq!(json["workouts"][0]["type"], "Walk");
        assert_eq!(json["workouts"][0]["durationMinutes"], 30);
        // No insight yet, so the key is omitted entirely
        assert!(json.get("aiInsight").is_none());
    }

    #[test]
    fn test_sparse_record_fills_defaults() {
        let record: DailyLogRecord = serde_json::from_str(r#"{"date":"2024-03-02"}"#).unwrap();
        assert_eq!(record, DailyLogRecord::empty("2024-03-02"));
    }

    #[test]
    fn test_food_item_protein_and_fat_default_to_zero() {
        let item: FoodItemRecord =
            serde_json::from_str(r#"{"id":"f1","name":"Roti","calories":100,"carbs":15}"#).unwrap();
        assert_eq!(item.protein, 0.0);
        assert_eq!(item.fat, 0.0);
    }
}
