use chrono::{DateTime, TimeZone, Utc};
use timeline_rs::core::{CalendarTimeZone, DAY_MS, HOUR_MS, LevelFormat, ZoomLevel};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("valid date")
}

#[test]
fn week_trims_to_monday_midnight() {
    let wednesday = utc(2024, 3, 6, 13, 45);
    assert_eq!(ZoomLevel::Week.trim_to_start(&wednesday), utc(2024, 3, 4, 0, 0));
    assert_eq!(ZoomLevel::Week.trim_to_end(&wednesday), utc(2024, 3, 11, 0, 0));
}

#[test]
fn sub_hour_levels_trim_to_their_bucket() {
    let date = utc(2024, 3, 6, 13, 47);
    assert_eq!(ZoomLevel::Minute.trim_to_start(&date), date);
    assert_eq!(ZoomLevel::TenMinute.trim_to_start(&date), utc(2024, 3, 6, 13, 40));
    assert_eq!(ZoomLevel::FifteenMinute.trim_to_start(&date), utc(2024, 3, 6, 13, 45));
    assert_eq!(ZoomLevel::Hour.trim_to_start(&date), utc(2024, 3, 6, 13, 0));
}

#[test]
fn trim_to_end_keeps_boundaries() {
    let midnight = utc(2024, 1, 1, 0, 0);
    for level in ZoomLevel::ALL {
        assert_eq!(level.trim_to_end(&midnight), midnight, "level {level}");
    }
    assert_eq!(ZoomLevel::Month.trim_to_end(&utc(2024, 1, 15, 8, 0)), utc(2024, 2, 1, 0, 0));
    assert_eq!(ZoomLevel::Year.trim_to_end(&utc(2024, 6, 1, 0, 0)), utc(2025, 1, 1, 0, 0));
}

#[test]
fn add_zero_returns_the_same_date() {
    let date = utc(2023, 7, 9, 11, 23);
    for level in ZoomLevel::ALL {
        assert_eq!(level.add(&date, 0), date, "level {level}");
    }
}

#[test]
fn month_add_clamps_to_month_length() {
    let january_end = utc(2024, 1, 31, 0, 0);
    assert_eq!(ZoomLevel::Month.add(&january_end, 1), utc(2024, 2, 29, 0, 0));
    assert_eq!(ZoomLevel::Year.add(&utc(2024, 2, 29, 0, 0), 1), utc(2025, 2, 28, 0, 0));
    assert_eq!(ZoomLevel::Month.add(&utc(2024, 3, 31, 0, 0), -1), utc(2024, 2, 29, 0, 0));
}

#[test]
fn leap_year_counts() {
    let start = utc(2020, 1, 1, 0, 0);
    let end = utc(2021, 1, 1, 0, 0);
    assert_eq!(ZoomLevel::Day.count(&start, &end), 366);
    assert_eq!(ZoomLevel::Hour.count(&start, &end), 366 * 24);
    assert_eq!(ZoomLevel::Month.count(&start, &end), 12);
    assert_eq!(ZoomLevel::Year.count(&start, &end), 1);
}

#[test]
fn fixed_offset_zone_moves_day_boundaries() {
    let tz = CalendarTimeZone::FixedOffsetMinutes { minutes: 120 };
    // 23:30 UTC is already 01:30 the next day at +02:00.
    let timestamp = utc(2024, 3, 4, 23, 30).timestamp_millis();
    let trimmed = ZoomLevel::Day
        .trim_timestamp_to_start(timestamp, tz)
        .expect("in range");
    assert_eq!(trimmed, utc(2024, 3, 4, 22, 0).timestamp_millis());
    assert_eq!(
        ZoomLevel::Day.add_timestamp(trimmed, 1, tz).expect("in range"),
        trimmed + DAY_MS
    );
}

#[test]
fn timestamp_helpers_match_datetime_math() {
    let tz = CalendarTimeZone::Utc;
    let start = utc(2024, 5, 1, 0, 0).timestamp_millis();
    let end = ZoomLevel::Hour.add_timestamp(start, 30, tz).expect("in range");
    assert_eq!(end - start, 30 * HOUR_MS);
    assert_eq!(ZoomLevel::Hour.count_timestamps(start, end, tz).expect("in range"), 30);
    assert!(ZoomLevel::Day.add_timestamp(i64::MAX, 1, tz).is_err());
}

#[test]
fn formats_follow_level_and_pattern() {
    let date = utc(2024, 3, 4, 13, 5);
    assert_eq!(ZoomLevel::Day.format(LevelFormat::Full, &date), "4 March 2024");
    assert_eq!(ZoomLevel::Day.format(LevelFormat::Short, &date), "4");
    assert_eq!(ZoomLevel::Month.format(LevelFormat::Medium, &date), "2024 Mar");
    assert_eq!(ZoomLevel::Hour.format(LevelFormat::Short, &date), "13");
    assert_eq!(ZoomLevel::Hour.format(LevelFormat::Full, &date), "13:05");
    assert_eq!(ZoomLevel::Year.format(LevelFormat::Full, &date), "2024");
}

#[test]
fn keys_round_trip_through_serde() {
    let json = serde_json::to_string(&ZoomLevel::FifteenMinute).expect("serialize");
    assert_eq!(json, "\"fifteenMinute\"");
    let parsed: ZoomLevel = serde_json::from_str("\"tenMinute\"").expect("deserialize");
    assert_eq!(parsed, ZoomLevel::TenMinute);
}
