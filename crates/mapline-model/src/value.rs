//! Single cell values flowing through the per-field pipeline.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One cell of a column, before it is materialized into a Polars series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Builds a value from a JSON scalar. Arrays and objects yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Int(i)),
                None => n.as_f64().map(Value::Float),
            },
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// String form of the value; `None` for nulls.
    pub fn as_text(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }

    /// Numeric view: numbers directly, strings when they parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Equality used by filters, with `self` as the cell and `other` as
    /// the configured value.
    ///
    /// Typed numeric cells compare numerically, so `100.0` matches `100`.
    /// Every other cell compares by exact string form, which keeps text
    /// identifiers such as `007` distinct from `7`. Nulls never match.
    pub fn filter_equals(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        if matches!(self, Value::Int(_) | Value::Float(_)) {
            if let Some(expected) = other.as_f64() {
                return self.as_f64() == Some(expected);
            }
        }
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Value::Null, Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_compare_numerically() {
        assert!(Value::Float(1.0).filter_equals(&Value::Int(1)));
        assert!(Value::Float(2.5).filter_equals(&Value::Str("2.5".into())));
        assert!(Value::Int(7).filter_equals(&Value::Str(" 7 ".into())));
        assert!(!Value::Int(7).filter_equals(&Value::Str("seven".into())));
    }

    #[test]
    fn text_cells_compare_exactly() {
        assert!(Value::Str("7".into()).filter_equals(&Value::Str("7".into())));
        assert!(Value::Str("7".into()).filter_equals(&Value::Int(7)));
        assert!(!Value::Str("007".into()).filter_equals(&Value::Str("7".into())));
        assert!(!Value::Str("7.0".into()).filter_equals(&Value::Int(7)));
        assert!(!Value::Str("a".into()).filter_equals(&Value::Str("A".into())));
        assert!(!Value::Null.filter_equals(&Value::Null));
    }

    #[test]
    fn display_formats_temporal_values() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-09");
        let dt = date.and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-09 07:05:00");
        assert_eq!(Value::Float(3.0).to_string(), "3");
    }

    #[test]
    fn from_json_rejects_containers() {
        assert_eq!(Value::from_json(&serde_json::json!(5)), Some(Value::Int(5)));
        assert_eq!(Value::from_json(&serde_json::json!([1])), None);
    }
}
