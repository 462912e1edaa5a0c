//! Per-sheet transformation pipeline: mapping, global steps, then filters.

use polars::prelude::DataFrame;
use tracing::{debug, info_span};

use mapline_model::{GlobalTransformation, SheetConfig};

use crate::error::Result;
use crate::filters::apply_filters;
use crate::global::apply_global_transformations;
use crate::mapper::map_columns;

/// Result of running one sheet through the pipeline.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub frame: DataFrame,
    pub warnings: Vec<String>,
    pub rows_in: usize,
    /// Rows after mapping and global steps, before filters.
    pub rows_transformed: usize,
    pub rows_out: usize,
}

/// Maps, transforms, and filters one located sheet.
pub fn transform_sheet(
    raw: &DataFrame,
    sheet: &SheetConfig,
    globals: &[GlobalTransformation],
) -> Result<TransformOutcome> {
    let span = info_span!("transform", sheet = %sheet.sheet_name, table = %sheet.target_table);
    let _guard = span.enter();

    let rows_in = raw.height();
    let mapped = map_columns(raw, &sheet.column_mappings)?;
    let mut warnings = mapped.warnings;

    let (frame, global_warnings) = apply_global_transformations(mapped.frame, globals)?;
    warnings.extend(global_warnings);
    let rows_transformed = frame.height();

    let (frame, filter_warnings) = apply_filters(frame, &sheet.filters)?;
    warnings.extend(filter_warnings);
    let rows_out = frame.height();

    debug!(rows_in, rows_transformed, rows_out, "sheet transformed");
    Ok(TransformOutcome {
        frame,
        warnings,
        rows_in,
        rows_transformed,
        rows_out,
    })
}
