use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

use crate::utils::constants::REPORT_WINDOW_DAYS;

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Report window `[now - 7 days, now]`.
pub fn report_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(REPORT_WINDOW_DAYS), now)
}
