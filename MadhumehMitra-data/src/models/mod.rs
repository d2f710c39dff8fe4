// Storage models, serialized as JSON into the key-value backends
pub mod daily_log;
pub mod identity;
pub mod preferences;
pub mod profile;

pub use daily_log::{DailyLogRecord, FoodItemRecord, LoggedMealRecord, WorkoutRecord};
pub use identity::Identity;
pub use preferences::LocalPreferencesRecord;
pub use profile::UserMetadataRecord;
