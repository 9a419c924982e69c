//! Cell parsers for timestamps and numbers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive formats tried after RFC 3339, in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a timestamp cell.
///
/// RFC 3339 values are converted to UTC and lose their offset; date-only
/// values map to midnight.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a numeric cell.
///
/// Surrounding whitespace, a leading `$` and `,` thousands separators are
/// accepted. Empty cells are not numbers.
pub fn parse_number(cell: &str) -> Option<f64> {
    let s = cell.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    if s.contains(',') {
        s.replace(',', "").parse().ok()
    } else {
        s.parse().ok()
    }
}
