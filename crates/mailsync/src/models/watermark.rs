//! Per-user watermark helpers

use chrono::{DateTime, Utc};

/// Watermark of a user that has never completed a sync
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Next watermark for a user whose run finished at `now`
///
/// Watermarks never move backwards, even when the caller's clock does.
pub fn advance_watermark(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous.max(now)
}
