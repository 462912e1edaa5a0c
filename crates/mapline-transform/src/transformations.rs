//! Per-field transformation chains.
//!
//! Each step maps one [`Value`] to another. Steps never fail: values that
//! cannot be converted become [`Value::Null`], and nulls pass through every
//! step unchanged.

use mapline_common::{parse_f64, parse_i64};
use mapline_model::{TransformationSpec, Value};
use tracing::warn;

use crate::dates::{parse_temporal, parse_with_format};

/// Applies one transformation step to a single value.
///
/// [`TransformationSpec::Unrecognized`] returns the value unchanged; the
/// chain runner reports it once per field.
pub fn apply_transformation(value: Value, spec: &TransformationSpec) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match spec {
        TransformationSpec::Uppercase => Value::Str(value.to_string().to_uppercase()),
        TransformationSpec::Lowercase => Value::Str(value.to_string().to_lowercase()),
        TransformationSpec::Strip => Value::Str(value.to_string().trim().to_string()),
        TransformationSpec::Replace {
            old_value,
            new_value,
        } => Value::Str(value.to_string().replace(old_value.as_str(), new_value)),
        TransformationSpec::DateFormat { input_format } => parse_date_value(value, input_format.as_deref()),
        TransformationSpec::NumericConversion => to_number(&value),
        TransformationSpec::Split { delimiter, index } => split_value(&value, delimiter, *index),
        TransformationSpec::Concat { prefix, suffix } => Value::Str(format!("{prefix}{value}{suffix}")),
        TransformationSpec::Unrecognized { .. } => value,
    }
}

/// Runs a transformation chain over a column's values.
///
/// Returns the transformed values and one warning per unrecognized step.
pub fn apply_transformations(
    mut values: Vec<Value>,
    specs: &[TransformationSpec],
    field: &str,
) -> (Vec<Value>, Vec<String>) {
    let mut warnings = Vec::new();
    for spec in specs {
        if let TransformationSpec::Unrecognized { tag } = spec {
            warn!(field = %field, transformation = %tag, "skipping unknown transformation");
            warnings.push(format!(
                "Unknown transformation type '{tag}' for field '{field}', skipped"
            ));
            continue;
        }
        values = values
            .into_iter()
            .map(|value| apply_transformation(value, spec))
            .collect();
    }
    (values, warnings)
}

fn parse_date_value(value: Value, format: Option<&str>) -> Value {
    match value {
        Value::Date(_) | Value::DateTime(_) => value,
        other => {
            let text = other.to_string();
            let parsed = match format {
                Some(format) => parse_with_format(&text, format),
                None => parse_temporal(&text),
            };
            parsed.unwrap_or(Value::Null)
        }
    }
}

/// Numeric view of a value: integral text becomes an integer, other
/// numeric text a float, anything else null.
pub fn to_number(value: &Value) -> Value {
    match value {
        Value::Int(_) | Value::Float(_) => value.clone(),
        Value::Bool(b) => Value::Int(i64::from(*b)),
        Value::Str(s) => {
            let trimmed = s.trim();
            if let Ok(v) = trimmed.parse::<i64>() {
                Value::Int(v)
            } else {
                parse_f64(trimmed).map_or(Value::Null, Value::Float)
            }
        }
        Value::Null | Value::Date(_) | Value::DateTime(_) => Value::Null,
    }
}

/// Integer view used by integer coercion; decimals are truncated.
pub(crate) fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(v) => Some(*v),
        Value::Float(v) if v.is_finite() => Some(v.trunc() as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Str(s) => parse_i64(s),
        _ => None,
    }
}

fn split_value(value: &Value, delimiter: &str, index: i64) -> Value {
    let text = value.to_string();
    let parts: Vec<&str> = text.split(delimiter).collect();
    let position = if index < 0 {
        usize::try_from(index.unsigned_abs())
            .ok()
            .and_then(|back| parts.len().checked_sub(back))
    } else {
        usize::try_from(index).ok()
    };
    position
        .and_then(|i| parts.get(i))
        .map_or(Value::Null, |part| Value::Str((*part).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn string_steps_use_string_form() {
        assert_eq!(apply_transformation(s("abc"), &TransformationSpec::Uppercase), s("ABC"));
        assert_eq!(apply_transformation(s("AbC"), &TransformationSpec::Lowercase), s("abc"));
        assert_eq!(apply_transformation(s("  x "), &TransformationSpec::Strip), s("x"));
        assert_eq!(apply_transformation(Value::Int(12), &TransformationSpec::Uppercase), s("12"));
        let replace = TransformationSpec::Replace {
            old_value: "Rs.".into(),
            new_value: String::new(),
        };
        assert_eq!(apply_transformation(s("Rs.120"), &replace), s("120"));
    }

    #[test]
    fn nulls_pass_through() {
        let concat = TransformationSpec::Concat {
            prefix: "<".into(),
            suffix: ">".into(),
        };
        assert_eq!(apply_transformation(Value::Null, &concat), Value::Null);
        assert_eq!(
            apply_transformation(Value::Null, &TransformationSpec::Strip),
            Value::Null
        );
    }

    #[test]
    fn date_format_parses_or_nulls() {
        let spec = TransformationSpec::DateFormat {
            input_format: Some("%d/%m/%Y".into()),
        };
        assert_eq!(
            apply_transformation(s("15/01/2024"), &spec),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(apply_transformation(s("yesterday"), &spec), Value::Null);
    }

    #[test]
    fn numeric_conversion() {
        let spec = TransformationSpec::NumericConversion;
        assert_eq!(apply_transformation(s(" 42 "), &spec), Value::Int(42));
        assert_eq!(apply_transformation(s("4.5"), &spec), Value::Float(4.5));
        assert_eq!(apply_transformation(s("n/a"), &spec), Value::Null);
    }

    #[test]
    fn split_supports_negative_indexes() {
        let spec = |index| TransformationSpec::Split {
            delimiter: "-".into(),
            index,
        };
        assert_eq!(apply_transformation(s("a-b-c"), &spec(1)), s("b"));
        assert_eq!(apply_transformation(s("a-b-c"), &spec(-1)), s("c"));
        assert_eq!(apply_transformation(s("a-b-c"), &spec(3)), Value::Null);
        assert_eq!(apply_transformation(s("a-b-c"), &spec(-4)), Value::Null);
    }

    #[test]
    fn chain_runs_in_order_and_reports_unknown_steps() {
        let specs = vec![
            TransformationSpec::Strip,
            TransformationSpec::Unrecognized {
                tag: "reverse".into(),
            },
            TransformationSpec::Concat {
                prefix: "ORD-".into(),
                suffix: String::new(),
            },
        ];
        let (values, warnings) = apply_transformations(vec![s(" 7 "), Value::Null], &specs, "order_id");
        assert_eq!(values, vec![s("ORD-7"), Value::Null]);
        assert_eq!(
            warnings,
            vec!["Unknown transformation type 'reverse' for field 'order_id', skipped".to_string()]
        );
    }
}
