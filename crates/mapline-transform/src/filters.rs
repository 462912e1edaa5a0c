//! Row filters declared per sheet.

use polars::prelude::*;
use tracing::{debug, warn};

use mapline_model::{FieldFilter, FilterSpec, Value};

use crate::error::Result;
use crate::global::filter_rows;
use crate::values::column_values;

/// Whether a single value passes a filter.
///
/// `not_equals` is the exact complement of `equals`, so nulls pass it.
pub fn value_matches(value: &Value, spec: &FilterSpec) -> bool {
    match spec {
        FilterSpec::Equals { value: expected } => value.filter_equals(expected),
        FilterSpec::NotEquals { value: expected } => !value.filter_equals(expected),
        FilterSpec::Contains { value: needle } => {
            !value.is_null() && value.to_string().contains(&needle.to_string())
        }
        FilterSpec::NotNull => !value.is_null(),
        FilterSpec::IsNull => value.is_null(),
        FilterSpec::Unrecognized { .. } => true,
    }
}

/// Applies filters in order, each narrowing the previous result.
///
/// Filters on absent fields and unknown filter types are skipped with a
/// warning.
pub fn apply_filters(df: DataFrame, filters: &[FieldFilter]) -> Result<(DataFrame, Vec<String>)> {
    let mut df = df;
    let mut warnings = Vec::new();
    for filter in filters {
        if let FilterSpec::Unrecognized { tag } = &filter.spec {
            warn!(field = %filter.field, filter = %tag, "skipping unknown filter");
            warnings.push(format!(
                "Unknown filter type '{tag}' for field '{}', skipped",
                filter.field
            ));
            continue;
        }
        let Ok(column) = df.column(&filter.field) else {
            warn!(field = %filter.field, "filter field not found");
            warnings.push(format!(
                "Filter field '{}' not found, filter skipped",
                filter.field
            ));
            continue;
        };
        let keep: Vec<bool> = column_values(column)
            .iter()
            .map(|value| value_matches(value, &filter.spec))
            .collect();
        let before = df.height();
        filter_rows(&mut df, &keep)?;
        debug!(
            field = %filter.field,
            filter = filter.spec.name(),
            rows_before = before,
            rows_after = df.height(),
            "applied filter"
        );
    }
    Ok((df, warnings))
}
