//! Timestamp helpers shared by the path map engine and the reclaim queue.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since the epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Hour-of-day (0–23, UTC) bucket for a millisecond timestamp. Used as the reclaim queue's
/// partition key (§4.5).
pub fn hour_of_day(millis: i64) -> i64 {
    (millis.div_euclid(3_600_000)).rem_euclid(24)
}
