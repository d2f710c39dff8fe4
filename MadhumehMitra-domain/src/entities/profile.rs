use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::nutrition::FoodItem;

/// Daily calorie target used until onboarding is complete
pub const DEFAULT_CALORIE_TARGET: u32 = 1800;

/// Daily water target in glasses used until onboarding is complete
pub const DEFAULT_WATER_TARGET: u32 = 8;

/// Sex used by the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
        }
    }

    /// Parse a stored level; anything unrecognised counts as sedentary
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or(ActivityLevel::Sedentary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            _ => Err(format!("Unknown activity level: {}", s)),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw body metrics collected at onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BodyProfile {
    /// Age in years
    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub age: u32,

    pub gender: Gender,

    /// Height in centimetres
    #[validate(range(min = 50.0, max = 272.0, message = "Height must be between 50 and 272 cm"))]
    pub height_cm: f64,

    /// Weight in kilograms
    #[validate(range(min = 2.0, max = 500.0, message = "Weight must be between 2 and 500 kg"))]
    pub weight_kg: f64,

    pub activity_level: ActivityLevel,
}

/// Metrics and daily targets derived from a [`BodyProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthTargets {
    /// Body mass index, one decimal place
    pub bmi: f64,

    /// Basal metabolic rate in kcal/day
    pub bmr: u32,

    /// Daily calorie target in kcal (maintenance TDEE)
    pub target_calories: u32,

    /// Daily water target in glasses
    pub target_water: u32,
}

/// Body metrics together with the targets derived from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub body: BodyProfile,
    pub targets: HealthTargets,
}

/// Typed view of a user's stored metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub onboarding_completed: bool,

    /// Present once onboarding stored a valid body profile
    pub profile: Option<UserProfile>,

    /// AI-estimated foods the user kept
    pub custom_foods: Vec<FoodItem>,
}

impl UserMetadata {
    /// Calorie target, or the default before onboarding
    pub fn calorie_target(&self) -> u32 {
        self.profile
            .as_ref()
            .map(|p| p.targets.target_calories)
            .filter(|target| *target > 0)
            .unwrap_or(DEFAULT_CALORIE_TARGET)
    }

    /// Water target in glasses, or the default before onboarding
    pub fn water_target(&self) -> u32 {
        self.profile
            .as_ref()
            .map(|p| p.targets.target_water)
            .filter(|target| *target > 0)
            .unwrap_or(DEFAULT_WATER_TARGET)
    }
}
