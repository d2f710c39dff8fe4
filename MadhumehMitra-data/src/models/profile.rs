use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::daily_log::{DailyLogRecord, FoodItemRecord};

/// Storage model for a user's profile metadata.
///
/// Every field is optional or defaulted so that partially written profiles
/// (before onboarding, or from an older app version) still decode. The domain
/// layer validates the body fields before trusting them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMetadataRecord {
    pub onboarding_completed: bool,

    pub age: Option<u32>,

    /// "male" or "female"
    pub gender: Option<String>,

    /// Height in centimetres
    pub height: Option<f64>,

    /// Weight in kilograms
    pub weight: Option<f64>,

    /// "sedentary", "light", "moderate" or "active"
    pub activity_level: Option<String>,

    pub bmi: Option<f64>,
    pub bmr: Option<u32>,
    pub target_calories: Option<u32>,
    pub target_water: Option<u32>,

    /// AI-estimated foods the user accepted
    pub custom_foods: Vec<FoodItemRecord>,

    /// Daily logs keyed by `YYYY-MM-DD`, retention-capped on write
    pub logs: BTreeMap<String, DailyLogRecord>,
}
