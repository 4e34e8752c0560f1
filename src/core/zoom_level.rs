use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Timelike,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::calendar::{
    CalendarTimeZone, DAY_MS, HOUR_MS, MINUTE_MS, Timestamp, WEEK_MS, resolve_local,
};
use crate::error::TimelineResult;

/// Label precision requested from [`ZoomLevel::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelFormat {
    Short,
    Medium,
    Full,
}

/// Time granularity of one grid cell on the axis.
///
/// Levels form a parent chain towards coarser granularities:
/// `minute -> tenMinute -> hour -> day -> week -> month -> year`, with
/// `fifteenMinute` also rolling up into `hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomLevel {
    Minute,
    TenMinute,
    FifteenMinute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 8] = [
        Self::Minute,
        Self::TenMinute,
        Self::FifteenMinute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::TenMinute => "tenMinute",
            Self::FifteenMinute => "fifteenMinute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Minute => Some(Self::TenMinute),
            Self::TenMinute | Self::FifteenMinute => Some(Self::Hour),
            Self::Hour => Some(Self::Day),
            Self::Day => Some(Self::Week),
            Self::Week => Some(Self::Month),
            Self::Month => Some(Self::Year),
            Self::Year => None,
        }
    }

    /// Iterates the coarser levels above `self`, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = ZoomLevel> {
        std::iter::successors(self.parent(), |level| level.parent())
    }

    /// Fixed cell length for granularities that have one.
    ///
    /// Months and years are calendar-dependent and return `None`.
    #[must_use]
    pub const fn fixed_length_ms(self) -> Option<i64> {
        match self {
            Self::Minute => Some(MINUTE_MS),
            Self::TenMinute => Some(10 * MINUTE_MS),
            Self::FifteenMinute => Some(15 * MINUTE_MS),
            Self::Hour => Some(HOUR_MS),
            Self::Day => Some(DAY_MS),
            Self::Week => Some(WEEK_MS),
            Self::Month | Self::Year => None,
        }
    }

    /// Floors `date` to the start of its grid cell.
    ///
    /// Weeks start on Monday 00:00.
    #[must_use]
    pub fn trim_to_start<Tz: TimeZone>(self, date: &DateTime<Tz>) -> DateTime<Tz> {
        let local = date.naive_local();
        let day = local.date();
        let (hour, minute) = (local.hour(), local.minute());

        let naive = match self {
            Self::Minute => at(day, hour, minute),
            Self::TenMinute => at(day, hour, minute / 10 * 10),
            Self::FifteenMinute => at(day, hour, minute / 15 * 15),
            Self::Hour => at(day, hour, 0),
            Self::Day => day.and_time(NaiveTime::MIN),
            Self::Week => {
                let back = u64::from(day.weekday().num_days_from_monday());
                day.checked_sub_days(Days::new(back))
                    .unwrap_or(day)
                    .and_time(NaiveTime::MIN)
            }
            Self::Month => first_of_month(day.year(), day.month()),
            Self::Year => first_of_month(day.year(), 1),
        };

        resolve_local(&date.timezone(), naive)
    }

    /// Ceils `date` to a grid boundary.
    ///
    /// A date already on a boundary is returned unchanged, anything else moves
    /// to the start of the next cell.
    #[must_use]
    pub fn trim_to_end<Tz: TimeZone>(self, date: &DateTime<Tz>) -> DateTime<Tz> {
        let start = self.trim_to_start(date);
        if start == *date {
            start
        } else {
            self.add(&start, 1)
        }
    }

    /// Advances `date` by `delta` cells.
    ///
    /// Sub-day levels move by absolute durations; days and weeks move the
    /// local calendar date; months and years move calendar months with the day
    /// clamped to the target month length. `delta == 0` returns `date`.
    #[must_use]
    pub fn add<Tz: TimeZone>(self, date: &DateTime<Tz>, delta: i64) -> DateTime<Tz> {
        if delta == 0 {
            return date.clone();
        }

        let moved = match self {
            Self::Minute | Self::TenMinute | Self::FifteenMinute | Self::Hour => self
                .fixed_length_ms()
                .and_then(|unit| TimeDelta::try_milliseconds(delta.checked_mul(unit)?))
                .and_then(|step| date.clone().checked_add_signed(step)),
            Self::Day => shift_days(date, delta),
            Self::Week => delta.checked_mul(7).and_then(|days| shift_days(date, days)),
            Self::Month => shift_months(date, delta),
            Self::Year => delta
                .checked_mul(12)
                .and_then(|months| shift_months(date, months)),
        };

        moved.unwrap_or_else(|| {
            warn!(level = self.key(), delta, "zoom level add overflowed, keeping date");
            date.clone()
        })
    }

    /// Number of cells between two boundaries.
    ///
    /// Fixed-length levels divide the elapsed milliseconds; months and years
    /// subtract calendar fields.
    #[must_use]
    pub fn count<Tz: TimeZone>(self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
        if let Some(unit) = self.fixed_length_ms() {
            let elapsed = end.timestamp_millis() - start.timestamp_millis();
            return (elapsed as f64 / unit as f64).round() as i64;
        }

        let (from, to) = (start.naive_local(), end.naive_local());
        let years = i64::from(to.year()) - i64::from(from.year());
        match self {
            Self::Year => years,
            _ => years * 12 + i64::from(to.month()) - i64::from(from.month()),
        }
    }

    /// Human label for the cell starting at `date`.
    #[must_use]
    pub fn format<Tz: TimeZone>(self, pattern: LevelFormat, date: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let layout = match (self, pattern) {
            (Self::Day, LevelFormat::Short) => "%-d",
            (Self::Day, LevelFormat::Medium) => "%-d %B",
            (Self::Day, LevelFormat::Full) => "%-d %B %Y",
            (Self::Hour, LevelFormat::Short) => "%H",
            (Self::Hour, _) => "%H:%M",
            (Self::Month, LevelFormat::Short) => "%b",
            (Self::Month, LevelFormat::Medium) => "%Y %b",
            (Self::Month, LevelFormat::Full) => "%Y %B",
            (Self::Year, _) => "%Y",
            (Self::Minute | Self::TenMinute | Self::FifteenMinute, _) => "%H:%M",
            (Self::Week, _) => {
                let start = self.trim_to_start(date);
                let last_day = Self::Day.add(&self.add(&start, 1), -1);
                return format!("{} - {}", date.format("%-d %b"), last_day.format("%-d %b"));
            }
        };
        date.format(layout).to_string()
    }

    pub fn trim_timestamp_to_start(
        self,
        timestamp: Timestamp,
        tz: CalendarTimeZone,
    ) -> TimelineResult<Timestamp> {
        Ok(self.trim_to_start(&tz.datetime(timestamp)?).timestamp_millis())
    }

    pub fn trim_timestamp_to_end(
        self,
        timestamp: Timestamp,
        tz: CalendarTimeZone,
    ) -> TimelineResult<Timestamp> {
        Ok(self.trim_to_end(&tz.datetime(timestamp)?).timestamp_millis())
    }

    pub fn add_timestamp(
        self,
        timestamp: Timestamp,
        delta: i64,
        tz: CalendarTimeZone,
    ) -> TimelineResult<Timestamp> {
        Ok(self.add(&tz.datetime(timestamp)?, delta).timestamp_millis())
    }

    pub fn count_timestamps(
        self,
        start: Timestamp,
        end: Timestamp,
        tz: CalendarTimeZone,
    ) -> TimelineResult<i64> {
        Ok(self.count(&tz.datetime(start)?, &tz.datetime(end)?))
    }

    pub fn format_timestamp(
        self,
        pattern: LevelFormat,
        timestamp: Timestamp,
        tz: CalendarTimeZone,
    ) -> TimelineResult<String> {
        Ok(self.format(pattern, &tz.datetime(timestamp)?))
    }
}

impl std::fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
}

fn first_of_month(year: i32, month: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

fn shift_days<Tz: TimeZone>(date: &DateTime<Tz>, days: i64) -> Option<DateTime<Tz>> {
    let local = date.naive_local();
    let step = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        local.checked_add_days(step)?
    } else {
        local.checked_sub_days(step)?
    };
    Some(resolve_local(&date.timezone(), shifted))
}

fn shift_months<Tz: TimeZone>(date: &DateTime<Tz>, months: i64) -> Option<DateTime<Tz>> {
    let local = date.naive_local();
    let step = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    let shifted = if months >= 0 {
        local.checked_add_months(step)?
    } else {
        local.checked_sub_months(step)?
    };
    Some(resolve_local(&date.timezone(), shifted))
}
