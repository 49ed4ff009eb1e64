//! Parsing for the fixed `MM-DD HH:MM:SS.mmm` log timestamp format.
//!
//! The format carries no year, so timestamps are interpreted in the current
//! year. Lexical ordering over the format is numerically correct within a
//! single-year window; a capture spanning a year boundary (Dec 31 -> Jan 1)
//! sorts incorrectly. Known limitation, not silently corrected.

use std::sync::LazyLock;

use regex::Regex;
use time::{Date, Month, PrimitiveDateTime, Time};

static TIMESTAMP_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})-(\d{2})\s+(\d{2}):(\d{2}):(\d{2})\.(\d{3})$").expect("timestamp regex")
});

static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3}").expect("timestamp prefix regex")
});

/// True when `s` starts with a millisecond-precision log timestamp.
pub fn has_millis_precision(s: &str) -> bool {
    TIMESTAMP_PREFIX.is_match(s)
}

/// Parse a complete `MM-DD HH:MM:SS.mmm` timestamp, assuming the current
/// year. Returns `None` for trailing content or out-of-range components.
pub fn parse_timestamp(s: &str) -> Option<PrimitiveDateTime> {
    let caps = TIMESTAMP_FULL.captures(s)?;
    let num = |i: usize| caps.get(i)?.as_str().parse::<u16>().ok();

    let month = Month::try_from(num(1)? as u8).ok()?;
    let date = Date::from_calendar_date(current_year(), month, num(2)? as u8).ok()?;
    let time = Time::from_hms_milli(num(3)? as u8, num(4)? as u8, num(5)? as u8, num(6)?).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

/// Signed difference `b - a` in seconds, when both timestamps parse.
pub fn seconds_between(a: &str, b: &str) -> Option<f64> {
    Some((parse_timestamp(b)? - parse_timestamp(a)?).as_seconds_f64())
}

/// Current UTC time as an RFC 3339 string, used for export metadata.
pub fn rfc3339_now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_timestamp() {
        let dt = parse_timestamp("09-17 10:30:15.123").unwrap();
        assert_eq!(dt.month(), Month::September);
        assert_eq!(dt.day(), 17);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.millisecond(), 123);
    }

    #[test]
    fn test_parse_rejects_trailing_content() {
        assert!(parse_timestamp("09-17 10:30:15.123 extra").is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_components() {
        assert!(parse_timestamp("13-01 00:00:00.000").is_none()); // month 13
        assert!(parse_timestamp("02-30 00:00:00.000").is_none()); // Feb 30
        assert!(parse_timestamp("01-01 24:00:00.000").is_none()); // hour 24
        assert!(parse_timestamp("garbage").is_none());
    }

    #[test]
    fn test_has_millis_precision_is_prefix_check() {
        assert!(has_millis_precision("09-17 10:30:15.123"));
        assert!(has_millis_precision("09-17 10:30:15.123 trailing"));
        assert!(!has_millis_precision("09-17 10:30:15"));
        assert!(!has_millis_precision("2024-09-17 10:30:15.123"));
    }

    #[test]
    fn test_seconds_between() {
        let d = seconds_between("09-17 10:30:15.123", "09-17 10:30:15.456").unwrap();
        assert!((d - 0.333).abs() < 1e-9);

        // Signed: earlier minus later is negative.
        let d = seconds_between("09-17 10:30:16.000", "09-17 10:30:15.000").unwrap();
        assert!((d + 1.0).abs() < 1e-9);

        assert!(seconds_between("bad", "09-17 10:30:15.000").is_none());
    }

    #[test]
    fn test_rfc3339_now_formats() {
        let s = rfc3339_now();
        assert!(s.contains('T'));
    }
}
