// Domain entities and value objects
pub mod conversions;
pub mod nutrition;
pub mod profile;

// Re-export common types for easier imports
pub use nutrition::{DailyLog, FoodItem, LoggedMeal, MealSlot, Workout};
pub use profile::{
    ActivityLevel, BodyProfile, Gender, HealthTargets, UserMetadata, UserProfile,
    DEFAULT_CALORIE_TARGET, DEFAULT_WATER_TARGET,
};
