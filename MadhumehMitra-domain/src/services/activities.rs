/// An activity the user can log, with its energy cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityType {
    pub id: &'static str,
    pub name: &'static str,
    pub calories_per_minute: f64,
}

/// Activities offered when logging a workout
pub static ACTIVITY_TYPES: [ActivityType; 6] = [
    ActivityType { id: "walk", name: "Walk", calories_per_minute: 4.0 },
    ActivityType { id: "run", name: "Run", calories_per_minute: 11.0 },
    ActivityType { id: "cycle", name: "Cycle", calories_per_minute: 8.0 },
    ActivityType { id: "yoga", name: "Yoga", calories_per_minute: 3.0 },
    ActivityType { id: "gym", name: "Gym", calories_per_minute: 6.0 },
    ActivityType { id: "home", name: "Chores", calories_per_minute: 3.0 },
];

/// Look up an activity by id, falling back to walking
pub fn find_activity(id: &str) -> &'static ActivityType {
    ACTIVITY_TYPES
        .iter()
        .find(|activity| activity.id == id)
        .unwrap_or(&ACTIVITY_TYPES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_activity() {
        assert_eq!(find_activity("run").calories_per_minute, 11.0);
        assert_eq!(find_activity("home").name, "Chores");
    }

    #[test]
    fn test_unknown_activity_falls_back_to_walk() {
        assert_eq!(find_activity("swim").id, "walk");
    }
}
