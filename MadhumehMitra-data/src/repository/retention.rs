use std::collections::BTreeMap;

use crate::models::DailyLogRecord;

/// Most daily logs kept in one profile
pub const MAX_STORED_LOGS: usize = 30;

/// Insert `log` into a date-keyed mapping, evicting the oldest dates first when a new key would exceed `cap`.
///
/// `YYYY-MM-DD` keys sort chronologically, so the first key of the map is the oldest day.
/// Overwriting a date that is already stored never evicts. Returns the evicted dates.
pub fn insert_with_retention(
    logs: &mut BTreeMap<String, DailyLogRecord>,
    log: DailyLogRecord,
    cap: usize,
) -> Vec<String> {
    let mut evicted = Vec::new();

    if !logs.contains_key(&log.date) {
        while !logs.is_empty() && logs.len() >= cap {
            if let Some((oldest, _)) = logs.pop_first() {
                evicted.push(oldest);
            }
        }
    }

    logs.insert(log.date.clone(), log);
    evicted
}
