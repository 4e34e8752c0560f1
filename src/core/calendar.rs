use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

pub const MINUTE_MS: i64 = 60 * 1_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;

/// Time zone used for calendar boundaries (day starts, week starts, months).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CalendarTimeZone {
    #[default]
    Utc,
    FixedOffsetMinutes {
        minutes: i16,
    },
}

impl CalendarTimeZone {
    #[must_use]
    pub fn offset_minutes(self) -> i16 {
        match self {
            Self::Utc => 0,
            Self::FixedOffsetMinutes { minutes } => minutes,
        }
    }

    #[must_use]
    pub fn fixed_offset(self) -> FixedOffset {
        let seconds = i32::from(self.offset_minutes()) * 60;
        FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
    }

    /// Converts an epoch timestamp into a calendar date in this zone.
    pub fn datetime(self, timestamp: Timestamp) -> TimelineResult<DateTime<FixedOffset>> {
        DateTime::<Utc>::from_timestamp_millis(timestamp)
            .map(|utc| utc.with_timezone(&self.fixed_offset()))
            .ok_or_else(|| {
                TimelineError::InvalidData(format!("timestamp {timestamp} is out of range"))
            })
    }
}

/// Resolves a wall-clock time in `tz`.
///
/// Ambiguous times pick the earlier instant; times inside a gap are read as UTC
/// wall-clock so the result is always defined.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(value) => value,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz.from_utc_datetime(&naive),
    }
}
