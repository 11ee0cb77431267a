//! Calendar-date helpers. Every date in the crate is a `NaiveDate`; strings
//! are converted here, once, at the boundary.

use chrono::{Datelike, Duration, NaiveDate};

/// Parses a `YYYY-MM-DD` key. Month and day may be unpadded, and anything
/// after a `T` or space (a time component) is ignored.
pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);

    let mut parts = date_part.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `None` when the result falls outside chrono's representable range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// "Mon, Jan 5"
pub fn format_short(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// "Monday, January 5, 2026"
pub fn format_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_padded_and_unpadded_keys() {
        assert_eq!(parse_date_key("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_key("2024-1-5"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_key(" 2024-12-31 "), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn ignores_time_component() {
        assert_eq!(
            parse_date_key("2024-03-09T23:15:00Z"),
            Some(ymd(2024, 3, 9))
        );
        assert_eq!(parse_date_key("2024-03-09 08:00"), Some(ymd(2024, 3, 9)));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_eq!(parse_date_key(""), None);
        assert_eq!(parse_date_key("yesterday"), None);
        assert_eq!(parse_date_key("2024-02-30"), None);
        assert_eq!(parse_date_key("2024-01-05-01"), None);
    }

    #[test]
    fn formats_for_display() {
        let date = ymd(2026, 1, 5);
        assert_eq!(date_key(date), "2026-01-05");
        assert_eq!(format_short(date), "Mon, Jan 5");
        assert_eq!(format_long(date), "Monday, January 5, 2026");
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(ymd(2024, 12, 31), 1), Some(ymd(2025, 1, 1)));
        assert_eq!(add_days(ymd(2024, 2, 28), 1), Some(ymd(2024, 2, 29)));
        assert!(same_month(ymd(2024, 2, 1), ymd(2024, 2, 29)));
        assert!(!same_month(ymd(2024, 2, 1), ymd(2025, 2, 1)));
    }

    #[test]
    fn add_days_stops_at_calendar_limits() {
        assert_eq!(add_days(NaiveDate::MAX, 1), None);
        assert_eq!(add_days(NaiveDate::MIN, -1), None);
        assert_eq!(add_days(ymd(2024, 1, 1), i64::MAX), None);
        let max_key = date_key(NaiveDate::MAX);
        assert_eq!(parse_date_key(&max_key), Some(NaiveDate::MAX));
    }
}
