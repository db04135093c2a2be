use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Which day a week is considered to start on when indexing weekdays.
///
/// `Sunday` gives Sunday=0 .. Saturday=6, `Monday` gives Monday=0 .. Sunday=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

const LABELS_FROM_SUNDAY: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Parse an ISO calendar date (`YYYY-MM-DD`).
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is not
/// a real calendar date, including out-of-range months and days.
///
/// # Examples
///
/// ```
/// use visitlog::time::parse_date;
///
/// assert!(parse_date("2024-06-01").is_some());
/// assert!(parse_date("2024-02-30").is_none());
/// assert!(parse_date("").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Parse a time of day as `HH:MM` or `HH:MM:SS`.
///
/// Seconds are accepted but dropped so that every parsed time sits on a
/// whole minute.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
}

/// Canonical `YYYY-MM-DD` key for a date.
///
/// Keys produced here sort lexicographically in calendar order.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Weekday index of `date` under the given week convention.
///
/// Derived from the calendar date alone, so the result does not depend on the
/// host timezone.
pub fn weekday_index(date: NaiveDate, week_start: WeekStart) -> u32 {
    match week_start {
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
        WeekStart::Monday => date.weekday().num_days_from_monday(),
    }
}

/// Short English label for a weekday index under the given convention.
pub fn weekday_label(index: u32, week_start: WeekStart) -> &'static str {
    let offset = match week_start {
        WeekStart::Sunday => 0,
        WeekStart::Monday => 1,
    };
    LABELS_FROM_SUNDAY[((index + offset) % 7) as usize]
}

/// Half-hour bucket label (`HH:00` or `HH:30`) for a time of day.
pub fn half_hour_bucket(time: NaiveTime) -> String {
    let half = if time.minute() < 30 { 0 } else { 30 };
    format!("{:02}:{:02}", time.hour(), half)
}

/// Minutes elapsed since midnight.
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_iso() {
        let date = parse_date("2024-06-01").unwrap();
        assert_eq!(date_key(date), "2024-06-01");
    }

    #[test]
    fn test_parse_date_normalizes_unpadded_fields() {
        let date = parse_date("2024-6-1").unwrap();
        assert_eq!(date_key(date), "2024-06-01");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("   ").is_none());
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(minute_of_day(parse_time("09:15").unwrap()), 555);
        assert_eq!(minute_of_day(parse_time("23:59:42").unwrap()), 1439);
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("").is_none());
    }

    #[test]
    fn test_weekday_index_known_dates() {
        // 2024-06-01 was a Saturday, 2024-06-02 a Sunday.
        let saturday = parse_date("2024-06-01").unwrap();
        let sunday = parse_date("2024-06-02").unwrap();
        assert_eq!(weekday_index(saturday, WeekStart::Sunday), 6);
        assert_eq!(weekday_index(sunday, WeekStart::Sunday), 0);
        assert_eq!(weekday_index(saturday, WeekStart::Monday), 5);
        assert_eq!(weekday_index(sunday, WeekStart::Monday), 6);
    }

    #[test]
    fn test_weekday_label_conventions() {
        assert_eq!(weekday_label(0, WeekStart::Sunday), "Sun");
        assert_eq!(weekday_label(0, WeekStart::Monday), "Mon");
        assert_eq!(weekday_label(6, WeekStart::Monday), "Sun");
    }

    #[test]
    fn test_half_hour_bucket() {
        assert_eq!(half_hour_bucket(parse_time("09:29").unwrap()), "09:00");
        assert_eq!(half_hour_bucket(parse_time("09:30").unwrap()), "09:30");
        assert_eq!(half_hour_bucket(parse_time("00:00").unwrap()), "00:00");
    }
}
