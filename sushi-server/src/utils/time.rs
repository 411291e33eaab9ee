//! Wall-clock helpers
//!
//! Timestamps are stored as Unix millis. Opening hours, promotions and slot
//! rules are evaluated on the restaurant's local clock, a fixed UTC offset.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};

pub const MINUTE_MS: i64 = 60_000;
pub const DAY_MS: i64 = 86_400_000;

/// Parse `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse `HH:MM` (a trailing `:SS` is accepted and ignored)
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Instant on the restaurant clock
pub fn to_local(millis: i64, tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    tz.timestamp_millis_opt(millis).single()
}

/// Local calendar date as `YYYY-MM-DD`
pub fn local_date_string(millis: i64, tz: FixedOffset) -> String {
    to_local(millis, tz)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Local wall-clock time as `HH:MM`
pub fn local_hhmm(millis: i64, tz: FixedOffset) -> String {
    to_local(millis, tz)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Weekday index with 0 = Sunday .. 6 = Saturday
pub fn weekday_index<Tz: TimeZone>(dt: &DateTime<Tz>) -> u8 {
    dt.weekday().num_days_from_sunday() as u8
}

/// Truncate to the start of the minute
pub fn minute_start(millis: i64) -> i64 {
    millis - millis.rem_euclid(MINUTE_MS)
}

/// Local date and time to Unix millis
pub fn local_to_millis(date: NaiveDate, time: NaiveTime, tz: FixedOffset) -> Option<i64> {
    date.and_time(time)
        .and_local_timezone(tz)
        .single()
        .map(|dt| dt.timestamp_millis())
}

/// `[start, end)` of a local day in Unix millis
pub fn day_bounds(date: NaiveDate, tz: FixedOffset) -> Option<(i64, i64)> {
    let start = local_to_millis(date, NaiveTime::MIN, tz)?;
    Some((start, start + DAY_MS))
}

/// Inclusive `HH:MM` window check. Strings are compared after parsing so
/// `9:05` and `09:05` behave the same.
pub fn time_in_window(time: NaiveTime, start: &str, end: &str) -> bool {
    match (parse_hhmm(start), parse_hhmm(end)) {
        (Some(s), Some(e)) => s <= time && time <= e,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn parses_times_and_dates() {
        assert_eq!(parse_hhmm("11:30"), NaiveTime::from_hms_opt(11, 30, 0));
        assert_eq!(parse_hhmm("11:30:45"), NaiveTime::from_hms_opt(11, 30, 0));
        assert!(parse_hhmm("1130").is_none());
        assert_eq!(parse_date("2026-03-10"), NaiveDate::from_ymd_opt(2026, 3, 10));
        assert!(parse_date("10/03/2026").is_none());
    }

    #[test]
    fn local_views_use_the_offset() {
        // 2026-03-10T11:00:00Z -> 12:00 in UTC+1
        let ms = 1_773_140_400_000;
        assert_eq!(local_hhmm(ms, paris()), "12:00");
        assert_eq!(local_date_string(ms, paris()), "2026-03-10");
        let dt = to_local(ms, paris()).unwrap();
        assert_eq!(weekday_index(&dt), 2); // Tuesday
    }

    #[test]
    fn minute_truncation() {
        assert_eq!(minute_start(120_000), 120_000);
        assert_eq!(minute_start(179_999), 120_000);
    }

    #[test]
    fn day_bounds_span_24h() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let (start, end) = day_bounds(date, paris()).unwrap();
        assert_eq!(end - start, DAY_MS);
        assert_eq!(local_hhmm(start, paris()), "00:00");
    }

    #[test]
    fn window_is_inclusive() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert!(time_in_window(t(11, 30), "11:30", "14:30"));
        assert!(time_in_window(t(14, 30), "11:30", "14:30"));
        assert!(!time_in_window(t(14, 31), "11:30", "14:30"));
        assert!(!time_in_window(t(12, 0), "bad", "14:30"));
    }
}
