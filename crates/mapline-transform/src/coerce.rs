//! Type coercion of transformed values into typed Polars columns.
//!
//! Coercion is total: a value that cannot be converted is replaced by the
//! mapping default (numeric types), or becomes null (everything else).

use polars::prelude::*;

use mapline_model::{ColumnType, Value};

use crate::dates::{days_since_epoch, value_to_date, value_to_datetime};
use crate::error::Result;
use crate::transformations::{to_integer, to_number};

/// Truthiness used by boolean coercion.
///
/// Recognized words map to their meaning, numbers are true when non-zero,
/// and any other non-empty text is true.
///
/// # Examples
///
/// ```
/// use mapline_model::Value;
/// use mapline_transform::to_bool;
///
/// assert_eq!(to_bool(&Value::Str("No".into())), Some(false));
/// assert_eq!(to_bool(&Value::Int(2)), Some(true));
/// assert_eq!(to_bool(&Value::Null), None);
/// ```
pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Int(v) => Some(*v != 0),
        Value::Float(v) => Some(*v != 0.0),
        Value::Date(_) | Value::DateTime(_) => Some(true),
        Value::Str(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            match lowered.as_str() {
                "" => None,
                "true" | "t" | "yes" | "y" | "1" => Some(true),
                "false" | "f" | "no" | "n" | "0" => Some(false),
                _ => Some(parse_number_flag(&lowered).unwrap_or(true)),
            }
        }
    }
}

fn parse_number_flag(text: &str) -> Option<bool> {
    match to_number(&Value::Str(text.to_string())) {
        Value::Int(v) => Some(v != 0),
        Value::Float(v) => Some(v != 0.0),
        _ => None,
    }
}

/// Builds a typed column from values.
///
/// `default` fills numeric cells that are null or unparsable; without one
/// they become zero.
pub fn coerce_column(
    name: &str,
    values: &[Value],
    column_type: ColumnType,
    default: Option<&Value>,
) -> Result<Column> {
    let series = match column_type {
        ColumnType::Integer => {
            let fill = default.and_then(to_integer).unwrap_or(0);
            let data: Vec<i64> = values
                .iter()
                .map(|v| to_integer(v).unwrap_or(fill))
                .collect();
            Series::new(name.into(), data)
        }
        ColumnType::Float | ColumnType::Decimal => {
            let fill = default.and_then(Value::as_f64).unwrap_or(0.0);
            let data: Vec<f64> = values
                .iter()
                .map(|v| as_float(v).unwrap_or(fill))
                .collect();
            Series::new(name.into(), data)
        }
        ColumnType::Boolean => {
            let data: Vec<Option<bool>> = values.iter().map(to_bool).collect();
            Series::new(name.into(), data)
        }
        ColumnType::Date => {
            let data: Vec<Option<i32>> = values
                .iter()
                .map(|v| value_to_date(v).and_then(days_since_epoch))
                .collect();
            Series::new(name.into(), data).cast(&DataType::Date)?
        }
        ColumnType::DateTime => {
            let data: Vec<Option<i64>> = values
                .iter()
                .map(|v| value_to_datetime(v).map(|dt| dt.and_utc().timestamp_millis()))
                .collect();
            Series::new(name.into(), data)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        ColumnType::String => {
            let data: Vec<Option<String>> = values.iter().map(Value::as_text).collect();
            Series::new(name.into(), data)
        }
    };
    Ok(series.into_column())
}

/// Column of `len` copies of `value`, coerced like any other column.
pub fn constant_column(
    name: &str,
    value: &Value,
    column_type: ColumnType,
    len: usize,
) -> Result<Column> {
    let values = vec![value.clone(); len];
    coerce_column(name, &values, column_type, Some(value))
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn integers_truncate_and_fill() {
        let column = coerce_column(
            "qty",
            &[s("3"), s("2.9"), s("abc"), Value::Null],
            ColumnType::Integer,
            Some(&Value::Int(1)),
        )
        .unwrap();
        let values: Vec<Option<i64>> = column.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(3), Some(2), Some(1), Some(1)]);
    }

    #[test]
    fn floats_default_to_zero() {
        let column =
            coerce_column("amount", &[s("10.5"), s("oops")], ColumnType::Decimal, None).unwrap();
        let values: Vec<Option<f64>> = column.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(10.5), Some(0.0)]);
    }

    #[test]
    fn booleans_use_truthiness() {
        let column = coerce_column(
            "paid",
            &[s("Yes"), s("0"), s("maybe"), Value::Null, s("0.0")],
            ColumnType::Boolean,
            None,
        )
        .unwrap();
        let values: Vec<Option<bool>> = column.bool().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![Some(true), Some(false), Some(true), None, Some(false)]
        );
    }

    #[test]
    fn dates_parse_or_null() {
        let column = coerce_column(
            "order_date",
            &[s("2024-01-02"), s("not a date")],
            ColumnType::Date,
            None,
        )
        .unwrap();
        assert_eq!(column.dtype(), &DataType::Date);
        assert_eq!(column.null_count(), 1);

        let dt = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let column =
            coerce_column("ts", &[Value::Date(dt)], ColumnType::DateTime, None).unwrap();
        assert_eq!(
            column.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(column.null_count(), 0);
    }

    #[test]
    fn strings_keep_nulls() {
        let column =
            coerce_column("name", &[Value::Int(5), Value::Null], ColumnType::String, None).unwrap();
        let values: Vec<Option<&str>> = column.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("5"), None]);
    }
}
