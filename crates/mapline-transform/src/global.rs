//! Table-level transformations applied after field mapping.

use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::{debug, warn};

use mapline_common::{any_is_null, any_to_string_opt};
use mapline_model::GlobalTransformation;

use crate::error::Result;

const KEY_SEPARATOR: char = '\u{1f}';
const NULL_MARKER: &str = "\u{0}";

/// Applies the source's global transformations in order.
///
/// Returns the new frame and warnings for skipped steps.
pub fn apply_global_transformations(
    df: DataFrame,
    specs: &[GlobalTransformation],
) -> Result<(DataFrame, Vec<String>)> {
    let mut df = df;
    let mut warnings = Vec::new();
    for spec in specs {
        let before = df.height();
        match spec {
            GlobalTransformation::RemoveEmptyRows => remove_empty_rows(&mut df)?,
            GlobalTransformation::RemoveDuplicates => remove_duplicates(&mut df)?,
            GlobalTransformation::Sort { columns, ascending } => {
                let present: Vec<String> = columns
                    .iter()
                    .filter(|name| {
                        let found = df.column(name.as_str()).is_ok();
                        if !found {
                            warnings.push(format!("Sort column '{name}' not found, ignored"));
                        }
                        found
                    })
                    .cloned()
                    .collect();
                if !present.is_empty() {
                    df = df.sort(
                        present,
                        SortMultipleOptions::default()
                            .with_order_descending(!ascending)
                            .with_nulls_last(true)
                            .with_maintain_order(true),
                    )?;
                }
            }
            GlobalTransformation::Unrecognized { tag } => {
                warn!(transformation = %tag, "skipping unknown global transformation");
                warnings.push(format!("Unknown global transformation type '{tag}', skipped"));
                continue;
            }
        }
        debug!(
            transformation = spec.name(),
            rows_before = before,
            rows_after = df.height(),
            "applied global transformation"
        );
    }
    Ok((df, warnings))
}

/// Drops rows where every column is null.
pub fn remove_empty_rows(df: &mut DataFrame) -> Result<()> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(());
    }
    let keep: Vec<bool> = (0..df.height())
        .map(|idx| {
            df.get_columns()
                .iter()
                .any(|column| !any_is_null(&column.get(idx).unwrap_or(AnyValue::Null)))
        })
        .collect();
    filter_rows(df, &keep)
}

/// Keeps the first occurrence of every fully identical row.
pub fn remove_duplicates(df: &mut DataFrame) -> Result<()> {
    if df.height() == 0 {
        return Ok(());
    }
    let mut seen = BTreeSet::new();
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut composite = String::new();
        for (pos, column) in df.get_columns().iter().enumerate() {
            if pos > 0 {
                composite.push(KEY_SEPARATOR);
            }
            match any_to_string_opt(column.get(idx).unwrap_or(AnyValue::Null)) {
                Some(text) => composite.push_str(&text),
                None => composite.push_str(NULL_MARKER),
            }
        }
        keep.push(seen.insert(composite));
    }
    filter_rows(df, &keep)
}

/// Filters `df` in place with a row mask.
pub(crate) fn filter_rows(df: &mut DataFrame, keep: &[bool]) -> Result<()> {
    if keep.iter().all(|k| *k) {
        return Ok(());
    }
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}
