//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Short date (like "2024-01-15")
pub fn short(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Long date (like "January 5, 2024")
pub fn long(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// ISO 8601 timestamp used in meta tags and structured data
pub fn iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// RFC 2822 date used by RSS
pub fn rfc2822(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse a date string in various formats, always as UTC
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
