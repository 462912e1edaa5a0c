//! Field accessors for explicit JSON config validation.

use serde_json::{Map, Value as Json};

use crate::error::ErrorCollector;

pub(crate) type Object = Map<String, Json>;

pub(crate) fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

pub(crate) fn index(path: &str, idx: usize) -> String {
    format!("{path}[{idx}]")
}

pub(crate) fn as_object<'a>(
    value: &'a Json,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<&'a Object> {
    match value.as_object() {
        Some(obj) => Some(obj),
        None => {
            errors.push(path, "must be an object");
            None
        }
    }
}

/// A present, non-empty string field.
pub(crate) fn required_string(
    obj: &Object,
    key: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Json::Null) => {
            errors.push(child(path, key), "is required");
            None
        }
        Some(Json::String(s)) if s.trim().is_empty() => {
            errors.push(child(path, key), "must not be empty");
            None
        }
        Some(Json::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(child(path, key), "must be a string");
            None
        }
    }
}

pub(crate) fn optional_string(
    obj: &Object,
    key: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Json::Null) => None,
        Some(Json::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(child(path, key), "must be a string");
            None
        }
    }
}

pub(crate) fn optional_bool(
    obj: &Object,
    key: &str,
    path: &str,
    default: bool,
    errors: &mut ErrorCollector,
) -> bool {
    match obj.get(key) {
        None | Some(Json::Null) => default,
        Some(Json::Bool(b)) => *b,
        Some(_) => {
            errors.push(child(path, key), "must be a boolean");
            default
        }
    }
}

pub(crate) fn optional_int(
    obj: &Object,
    key: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<i64> {
    match obj.get(key) {
        None | Some(Json::Null) => None,
        Some(value) => match value.as_i64() {
            Some(v) => Some(v),
            None => {
                errors.push(child(path, key), "must be an integer");
                None
            }
        },
    }
}

/// A list of strings; a bare string counts as a one-element list.
pub(crate) fn string_list(
    obj: &Object,
    key: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<Vec<String>> {
    match obj.get(key) {
        None | Some(Json::Null) => None,
        Some(Json::String(s)) => Some(vec![s.clone()]),
        Some(Json::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => errors.push(index(&child(path, key), idx), "must be a string"),
                }
            }
            Some(out)
        }
        Some(_) => {
            errors.push(child(path, key), "must be a list of strings");
            None
        }
    }
}

pub(crate) fn optional_array<'a>(
    obj: &'a Object,
    key: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> &'a [Json] {
    match obj.get(key) {
        None | Some(Json::Null) => &[],
        Some(Json::Array(items)) => items,
        Some(_) => {
            errors.push(child(path, key), "must be a list");
            &[]
        }
    }
}
