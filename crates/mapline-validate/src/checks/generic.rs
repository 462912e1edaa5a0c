//! Checks applied to every table regardless of its target.

use polars::prelude::{AnyValue, Column, DataFrame, DataType};

use mapline_common::{any_is_null, parse_f64};
use mapline_model::ValidationResult;

/// String values longer than this are flagged.
pub const MAX_VALUE_CHARS: usize = 1000;

pub fn empty_rows(df: &DataFrame, result: &mut ValidationResult) {
    let empty = (0..df.height())
        .filter(|idx| {
            df.get_columns()
                .iter()
                .all(|column| any_is_null(&column.get(*idx).unwrap_or(AnyValue::Null)))
        })
        .count();
    if empty > 0 {
        result.add_warning(format!("Found {empty} completely empty rows"));
    }
}

pub fn null_columns(df: &DataFrame, result: &mut ValidationResult) {
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column.null_count() == column.len())
        .map(|column| column.name().to_string())
        .collect();
    if !names.is_empty() {
        result.add_warning(format!("Columns with all null values: {names:?}"));
    }
}

/// Text columns holding both numeric and non-numeric values.
pub fn mixed_types(df: &DataFrame, result: &mut ValidationResult) {
    for column in text_columns(df) {
        let Ok(values) = column.str() else {
            continue;
        };
        let mut present = 0usize;
        let mut numeric = 0usize;
        for value in values.into_iter().flatten() {
            present += 1;
            if parse_f64(value).is_some() {
                numeric += 1;
            }
        }
        if numeric > 0 && numeric < present {
            result.add_warning(format!("Column '{}' has mixed data types", column.name()));
        }
    }
}

pub fn long_values(df: &DataFrame, result: &mut ValidationResult) {
    for column in text_columns(df) {
        let Ok(values) = column.str() else {
            continue;
        };
        let longest = values
            .into_iter()
            .flatten()
            .map(|value| value.chars().count())
            .max()
            .unwrap_or(0);
        if longest > MAX_VALUE_CHARS {
            result.add_warning(format!(
                "Column '{}' has very long values (max: {longest} chars)",
                column.name()
            ));
        }
    }
}

fn text_columns(df: &DataFrame) -> impl Iterator<Item = &Column> {
    df.get_columns()
        .iter()
        .filter(|column| column.dtype() == &DataType::String)
}
