//! Timestamp parsing for imported CSV rows.
//!
//! Times without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses RFC 3339, `YYYY-MM-DD HH:MM[:SS[.fff]]` or a bare `YYYY-MM-DD`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// MetaTrader writes dates as `YYYY.MM.DD`; the first two dots become dashes.
#[must_use]
pub fn normalize_metatrader(raw: &str) -> String {
    raw.trim().replacen('.', "-", 2)
}

/// Parses a MetaTrader `Open Time`/`Close Time` cell.
#[must_use]
pub fn parse_metatrader_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(&normalize_metatrader(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_common_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-01-15T10:30:00 "), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-40 10:00:00"), None);
    }

    #[test]
    fn metatrader_dots_are_normalized() {
        assert_eq!(normalize_metatrader("2024.01.15 10:30:00"), "2024-01-15 10:30:00");
        assert_eq!(
            parse_metatrader_timestamp("2024.01.15 10:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_metatrader_timestamp("2024.01.15 10:30"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
        // Dashed dates pass through unchanged
        assert!(parse_metatrader_timestamp("2024-01-15 10:30:00").is_some());
        assert_eq!(parse_metatrader_timestamp("15/01/2024 10:30"), None);
    }
}
