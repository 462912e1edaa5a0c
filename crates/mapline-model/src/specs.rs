//! Tagged specs for per-field transformations, row filters, and
//! table-wide transformations.
//!
//! Each family is a closed enum with an explicit `Unrecognized` case so that
//! configs naming an unknown operation still load; the operation is then
//! skipped with a warning at run time.

use serde::Serialize;
use serde_json::Value as Json;

use crate::error::{ConfigValidationError, ErrorCollector};
use crate::fields::{
    as_object, child, optional_bool, optional_int, optional_string, required_string, string_list,
};
use crate::value::Value;

/// One step of a per-field transformation chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformationSpec {
    Uppercase,
    Lowercase,
    Strip,
    Replace {
        old_value: String,
        new_value: String,
    },
    /// Parse with an explicit strftime-style format; without one the
    /// value is parsed with the automatic date formats.
    DateFormat {
        input_format: Option<String>,
    },
    NumericConversion,
    /// Keep the `index`-th piece; negative indexes count from the end.
    Split {
        delimiter: String,
        index: i64,
    },
    Concat {
        prefix: String,
        suffix: String,
    },
    Unrecognized {
        tag: String,
    },
}

impl TransformationSpec {
    /// Parse a single spec object.
    pub fn from_json(value: &Json) -> Result<Self, ConfigValidationError> {
        let mut errors = ErrorCollector::default();
        let spec = Self::parse(value, "", &mut errors);
        errors.finish_parsed(spec)
    }

    pub(crate) fn parse(value: &Json, path: &str, errors: &mut ErrorCollector) -> Option<Self> {
        let obj = as_object(value, path, errors)?;
        let tag = required_string(obj, "type", path, errors)?;
        let spec = match tag.as_str() {
            "uppercase" => TransformationSpec::Uppercase,
            "lowercase" => TransformationSpec::Lowercase,
            "strip" => TransformationSpec::Strip,
            "replace" => {
                let old_value = required_string(obj, "old_value", path, errors)?;
                let new_value = optional_string(obj, "new_value", path, errors).unwrap_or_default();
                TransformationSpec::Replace {
                    old_value,
                    new_value,
                }
            }
            "date_format" => TransformationSpec::DateFormat {
                input_format: optional_string(obj, "input_format", path, errors)
                    .filter(|f| !f.trim().is_empty()),
            },
            "numeric_conversion" => TransformationSpec::NumericConversion,
            "split" => {
                let delimiter =
                    optional_string(obj, "delimiter", path, errors).unwrap_or_else(|| ",".into());
                if delimiter.is_empty() {
                    errors.push(child(path, "delimiter"), "must not be empty");
                    return None;
                }
                TransformationSpec::Split {
                    delimiter,
                    index: optional_int(obj, "index", path, errors).unwrap_or(0),
                }
            }
            "concat" => TransformationSpec::Concat {
                prefix: optional_string(obj, "prefix", path, errors).unwrap_or_default(),
                suffix: optional_string(obj, "suffix", path, errors).unwrap_or_default(),
            },
            _ => TransformationSpec::Unrecognized { tag },
        };
        Some(spec)
    }

    /// The config tag naming this step.
    pub fn name(&self) -> &str {
        match self {
            TransformationSpec::Uppercase => "uppercase",
            TransformationSpec::Lowercase => "lowercase",
            TransformationSpec::Strip => "strip",
            TransformationSpec::Replace { .. } => "replace",
            TransformationSpec::DateFormat { .. } => "date_format",
            TransformationSpec::NumericConversion => "numeric_conversion",
            TransformationSpec::Split { .. } => "split",
            TransformationSpec::Concat { .. } => "concat",
            TransformationSpec::Unrecognized { tag } => tag,
        }
    }
}

/// A row predicate on one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterSpec {
    Equals { value: Value },
    NotEquals { value: Value },
    Contains { value: Value },
    NotNull,
    IsNull,
    Unrecognized { tag: String },
}

impl FilterSpec {
    pub fn from_json(value: &Json) -> Result<Self, ConfigValidationError> {
        let mut errors = ErrorCollector::default();
        let spec = Self::parse(value, "", &mut errors);
        errors.finish_parsed(spec)
    }

    /// Objects are tagged by `type` (default `equals`); a bare scalar is
    /// shorthand for `equals`.
    pub(crate) fn parse(value: &Json, path: &str, errors: &mut ErrorCollector) -> Option<Self> {
        let Some(obj) = value.as_object() else {
            return match Value::from_json(value) {
                Some(Value::Null) | None => {
                    errors.push(path, "must be a filter object or a scalar value");
                    None
                }
                Some(scalar) => Some(FilterSpec::Equals { value: scalar }),
            };
        };
        let tag = optional_string(obj, "type", path, errors).unwrap_or_else(|| "equals".into());
        let spec = match tag.as_str() {
            "equals" => FilterSpec::Equals {
                value: filter_operand(obj, path, &tag, errors)?,
            },
            "not_equals" => FilterSpec::NotEquals {
                value: filter_operand(obj, path, &tag, errors)?,
            },
            "contains" => FilterSpec::Contains {
                value: filter_operand(obj, path, &tag, errors)?,
            },
            "not_null" => FilterSpec::NotNull,
            "is_null" => FilterSpec::IsNull,
            _ => FilterSpec::Unrecognized { tag },
        };
        Some(spec)
    }

    pub fn name(&self) -> &str {
        match self {
            FilterSpec::Equals { .. } => "equals",
            FilterSpec::NotEquals { .. } => "not_equals",
            FilterSpec::Contains { .. } => "contains",
            FilterSpec::NotNull => "not_null",
            FilterSpec::IsNull => "is_null",
            FilterSpec::Unrecognized { tag } => tag,
        }
    }
}

fn filter_operand(
    obj: &crate::fields::Object,
    path: &str,
    tag: &str,
    errors: &mut ErrorCollector,
) -> Option<Value> {
    let value_path = child(path, "value");
    match obj.get("value").map(Value::from_json) {
        None | Some(Some(Value::Null)) => {
            errors.push(value_path, format!("is required for '{tag}' filters"));
            None
        }
        Some(None) => {
            errors.push(value_path, "must be a scalar");
            None
        }
        Some(Some(v)) => Some(v),
    }
}

/// A transformation applied to a whole mapped table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GlobalTransformation {
    RemoveEmptyRows,
    RemoveDuplicates,
    Sort { columns: Vec<String>, ascending: bool },
    Unrecognized { tag: String },
}

impl GlobalTransformation {
    pub(crate) fn parse(value: &Json, path: &str, errors: &mut ErrorCollector) -> Option<Self> {
        let obj = as_object(value, path, errors)?;
        let tag = required_string(obj, "type", path, errors)?;
        let spec = match tag.as_str() {
            "remove_empty_rows" => GlobalTransformation::RemoveEmptyRows,
            "remove_duplicates" => GlobalTransformation::RemoveDuplicates,
            "sort" => GlobalTransformation::Sort {
                columns: string_list(obj, "columns", path, errors).unwrap_or_default(),
                ascending: optional_bool(obj, "ascending", path, true, errors),
            },
            _ => GlobalTransformation::Unrecognized { tag },
        };
        Some(spec)
    }

    pub fn name(&self) -> &str {
        match self {
            GlobalTransformation::RemoveEmptyRows => "remove_empty_rows",
            GlobalTransformation::RemoveDuplicates => "remove_duplicates",
            GlobalTransformation::Sort { .. } => "sort",
            GlobalTransformation::Unrecognized { tag } => tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_defaults() {
        let spec = TransformationSpec::from_json(&json!({"type": "split"})).unwrap();
        assert_eq!(
            spec,
            TransformationSpec::Split {
                delimiter: ",".into(),
                index: 0
            }
        );
    }

    #[test]
    fn unknown_transformation_is_kept_as_unrecognized() {
        let spec = TransformationSpec::from_json(&json!({"type": "reverse"})).unwrap();
        assert_eq!(spec.name(), "reverse");
        assert!(matches!(spec, TransformationSpec::Unrecognized { .. }));
    }

    #[test]
    fn missing_transformation_type_is_an_error() {
        let err = TransformationSpec::from_json(&json!({"old_value": "a"})).unwrap_err();
        assert_eq!(err.errors[0].path, "type");
    }

    #[test]
    fn filter_scalar_is_equals_shorthand() {
        let spec = FilterSpec::from_json(&json!("delivered")).unwrap();
        assert_eq!(
            spec,
            FilterSpec::Equals {
                value: Value::Str("delivered".into())
            }
        );
    }

    #[test]
    fn filter_type_defaults_to_equals() {
        let spec = FilterSpec::from_json(&json!({"value": 3})).unwrap();
        assert_eq!(spec, FilterSpec::Equals { value: Value::Int(3) });
    }

    #[test]
    fn equals_filter_requires_value() {
        let err = FilterSpec::from_json(&json!({"type": "not_equals"})).unwrap_err();
        assert_eq!(err.errors[0].path, "value");
    }

    #[test]
    fn sort_accepts_single_column() {
        let mut errors = ErrorCollector::default();
        let spec =
            GlobalTransformation::parse(&json!({"type": "sort", "columns": "a"}), "", &mut errors);
        assert_eq!(
            spec,
            Some(GlobalTransformation::Sort {
                columns: vec!["a".into()],
                ascending: true
            })
        );
    }
}
