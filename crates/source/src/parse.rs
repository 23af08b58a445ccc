//! Lenient scalar parsing
//!
//! CSV exports produced by data-frame tools write nullable integer columns
//! as floats (`"10.0"`) and leave missing values empty. These helpers accept
//! those shapes and map anything unusable to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Trim a text cell, mapping blanks to `None`
pub fn clean_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an integer identifier
///
/// Accepts `"42"`, `" 42 "` and whole floats such as `"42.0"`.
pub fn parse_id(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(id) = value.parse::<i64>() {
        return Some(id);
    }
    value.parse::<f64>().ok().and_then(whole_number)
}

/// Convert a float to an integer id when it has no fractional part
pub fn whole_number(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse an optional text cell as an identifier
pub fn parse_id_cell(value: Option<&str>) -> Option<i64> {
    clean_text(value).and_then(parse_id)
}

/// Parse an event timestamp
///
/// Naive timestamps are taken as UTC; RFC 3339 values with an offset are
/// normalised to UTC; a bare date means midnight.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}
