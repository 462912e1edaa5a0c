//! Conversions between Polars columns and per-cell [`Value`]s.

use chrono::DateTime;
use polars::prelude::*;

use mapline_model::Value;

use crate::dates::date_from_epoch_days;

/// Converts a single `AnyValue` into a [`Value`].
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::Str(s.to_string()),
        AnyValue::StringOwned(s) => Value::Str(s.to_string()),
        AnyValue::Int8(v) => Value::Int(i64::from(v)),
        AnyValue::Int16(v) => Value::Int(i64::from(v)),
        AnyValue::Int32(v) => Value::Int(i64::from(v)),
        AnyValue::Int64(v) => Value::Int(v),
        AnyValue::UInt8(v) => Value::Int(i64::from(v)),
        AnyValue::UInt16(v) => Value::Int(i64::from(v)),
        AnyValue::UInt32(v) => Value::Int(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        AnyValue::Date(days) => date_from_epoch_days(days).map_or(Value::Null, Value::Date),
        AnyValue::Datetime(v, unit, _) => {
            let micros = match unit {
                TimeUnit::Nanoseconds => v.div_euclid(1_000),
                TimeUnit::Microseconds => v,
                TimeUnit::Milliseconds => v.saturating_mul(1_000),
            };
            DateTime::from_timestamp_micros(micros)
                .map_or(Value::Null, |dt| Value::DateTime(dt.naive_utc()))
        }
        other => Value::Str(other.to_string()),
    }
}

/// Materializes a column as owned values, one per row.
pub fn column_values(column: &Column) -> Vec<Value> {
    (0..column.len())
        .map(|idx| any_to_value(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Values of one row across all columns, in column order.
pub fn row_values(df: &DataFrame, row: usize) -> Vec<Value> {
    df.get_columns()
        .iter()
        .map(|column| any_to_value(column.get(row).unwrap_or(AnyValue::Null)))
        .collect()
}
