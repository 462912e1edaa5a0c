//! Date and datetime parsing.
//!
//! Values are parsed either with an explicit strftime-style format or by
//! trying a fixed list of common export formats. Ambiguous slash dates are
//! read month-first, matching most spreadsheet exports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use mapline_model::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parses a value with an explicit format.
///
/// Formats carrying a time produce [`Value::DateTime`], date-only formats
/// produce [`Value::Date`]. Returns `None` when the value does not match.
pub fn parse_with_format(value: &str, format: &str) -> Option<Value> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Some(Value::DateTime(dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
        return Some(Value::DateTime(dt.naive_utc()));
    }
    NaiveDate::parse_from_str(trimmed, format)
        .ok()
        .map(Value::Date)
}

/// Parses a value by trying the known export formats.
///
/// # Examples
///
/// ```
/// use mapline_model::Value;
/// use mapline_transform::parse_temporal;
///
/// assert!(matches!(parse_temporal("2024-01-15"), Some(Value::Date(_))));
/// assert!(matches!(parse_temporal("2024-01-15 10:30"), Some(Value::DateTime(_))));
/// assert_eq!(parse_temporal("soon"), None);
/// ```
pub fn parse_temporal(value: &str) -> Option<Value> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(Value::DateTime(dt.naive_utc()));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Value::DateTime(dt));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(Value::Date(d));
        }
    }
    None
}

/// Date part of a temporal value, parsing text when needed.
pub fn value_to_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::Str(s) => value_to_date(&parse_temporal(s)?),
        _ => None,
    }
}

/// Datetime view of a temporal value; dates land on midnight.
pub fn value_to_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Value::DateTime(dt) => Some(*dt),
        Value::Str(s) => value_to_datetime(&parse_temporal(s)?),
        _ => None,
    }
}

/// Days since 1970-01-01, the physical representation of a date column.
pub fn days_since_epoch(date: NaiveDate) -> Option<i32> {
    let seconds = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    i32::try_from(seconds.div_euclid(86_400)).ok()
}

/// Inverse of [`days_since_epoch`].
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    DateTime::from_timestamp(i64::from(days) * 86_400, 0).map(|dt| dt.date_naive())
}
