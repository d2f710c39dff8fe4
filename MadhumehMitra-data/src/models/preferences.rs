use serde::{Deserialize, Serialize};

/// Device-local preferences that outlive a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalPreferencesRecord {
    /// Epoch milliseconds of the last hydration reminder, 0 if never
    pub last_water_notif_at: i64,

    /// Epoch milliseconds of the last activity reminder, 0 if never
    pub last_activity_notif_at: i64,

    /// Whether the user chose to continue as a guest
    pub guest_mode: bool,
}
