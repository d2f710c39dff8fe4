pub mod activities;
pub mod catalog;
pub mod daily_log;
pub mod history;
pub mod insights;
pub mod metrics;
pub mod onboarding;

// Domain services
// Pure computations plus the services that persist their results.

pub use activities::{find_activity, ActivityType, ACTIVITY_TYPES};
pub use catalog::{FoodCatalog, BASE_FOODS};
pub use daily_log::{DailyLogService, DailySummary, LogChange, PendingMeal, PersistOutcome};
pub use history::{build_week, chart_points, ChartPoint, HISTORY_WINDOW_DAYS};
pub use insights::{refresh_insight, AiAssistant};
pub use metrics::compute_targets;
pub use onboarding::{complete_onboarding, ProfileError, ProfileService};
