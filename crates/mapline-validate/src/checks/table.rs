//! Checks driven by a table's registered rules.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::{AnyValue, Column, DataFrame};

use mapline_common::{any_is_null, any_to_f64, any_to_string_opt};
use mapline_model::ValidationResult;

use crate::rules::{AllowedValues, RangeRule, TableRules, UniqueRule};
use crate::util::CaseInsensitiveSet;

/// Required fields must exist and carry no nulls.
pub fn required(
    rules: &TableRules,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    result: &mut ValidationResult,
) {
    for field in rules.required {
        let Some(column) = lookup(df, columns, field) else {
            result.add_error(Some(*field), format!("Required column missing: {field}"));
            continue;
        };
        let nulls = null_count(column);
        if nulls > 0 {
            result.add_error(
                Some(*field),
                format!("Column '{field}' has {nulls} null values"),
            );
        }
    }
}

pub fn unique(
    rule: &UniqueRule,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    result: &mut ValidationResult,
) {
    let Some(column) = lookup(df, columns, rule.field) else {
        return;
    };
    let mut seen = HashSet::new();
    let duplicates = texts(column)
        .filter(|value| !seen.insert(value.clone()))
        .count();
    if duplicates > 0 {
        result.add_warning(format!("Found {duplicates} duplicate {}", rule.label));
    }
}

/// Distinct values outside the allowed set, reported in first-seen order.
pub fn allowed(
    rule: &AllowedValues,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    result: &mut ValidationResult,
) {
    let Some(column) = lookup(df, columns, rule.field) else {
        return;
    };
    let mut reported = BTreeSet::new();
    let mut invalid = Vec::new();
    for value in texts(column) {
        if !rule.values.contains(&value.as_str()) && reported.insert(value.clone()) {
            invalid.push(value);
        }
    }
    if !invalid.is_empty() {
        result.add_warning(format!("Invalid {} found: {invalid:?}", rule.label));
    }
}

pub fn range(
    rule: &RangeRule,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    result: &mut ValidationResult,
) {
    let Some(column) = lookup(df, columns, rule.field) else {
        return;
    };
    let count = (0..column.len())
        .filter_map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .filter(|v| if rule.allow_zero { *v < 0.0 } else { *v <= 0.0 })
        .count();
    if count > 0 {
        result.add_warning(
            rule.message
                .replace("{count}", &count.to_string())
                .replace("{field}", rule.field),
        );
    }
}

fn lookup<'a>(df: &'a DataFrame, columns: &CaseInsensitiveSet, field: &str) -> Option<&'a Column> {
    columns.get(field).and_then(|name| df.column(name).ok())
}

fn null_count(column: &Column) -> usize {
    (0..column.len())
        .filter(|idx| any_is_null(&column.get(*idx).unwrap_or(AnyValue::Null)))
        .count()
}

/// Non-null values of a column in string form.
fn texts(column: &Column) -> impl Iterator<Item = String> + '_ {
    (0..column.len())
        .filter_map(|idx| any_to_string_opt(column.get(idx).unwrap_or(AnyValue::Null)))
}
