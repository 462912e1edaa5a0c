//! Applies a sheet layout (header row, data start, skipped rows) to a raw
//! grid and builds the located table as a string-typed DataFrame.
//!
//! All row numbers in a [`SheetConfig`] are 1-based and refer to rows of the
//! original file, so `skip_rows` never shifts when banner rows are present.

use std::collections::BTreeSet;

use mapline_common::string_column;
use mapline_model::SheetConfig;
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::header::{locate_header, normalize_text};

/// Trims a data cell and drops a stray byte-order mark.
pub fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Builds the located table for one sheet from its raw rows.
///
/// Empty grids produce an empty frame. Fully-empty data rows are dropped,
/// empty cells become nulls.
///
/// # Errors
///
/// Fails when `header_columns` is configured and no row matches, or when the
/// configured header row lies past the end of a non-empty grid.
pub fn frame_from_grid(
    grid: &[Vec<String>],
    sheet: &SheetConfig,
    source_name: &str,
) -> Result<DataFrame> {
    if grid.is_empty() {
        return Ok(DataFrame::empty());
    }
    let skip: BTreeSet<usize> = sheet.skip_rows.iter().copied().collect();

    let (headers, data): (Vec<String>, Vec<Vec<String>>) = match &sheet.header_columns {
        Some(expected) => {
            let located = locate_header(grid, expected).map_err(|err| match err {
                IngestError::HeaderNotFound { .. } => IngestError::HeaderNotFound {
                    source_name: Some(source_name.to_string()),
                },
                other => other,
            })?;
            let header_row = located.header_index + 1;
            debug!(
                source = source_name,
                header_row,
                score = located.score,
                "located header row"
            );
            let rows = located
                .rows
                .into_iter()
                .enumerate()
                .filter(|(offset, _)| !skip.contains(&(header_row + 1 + offset)))
                .map(|(_, row)| row)
                .collect();
            (located.columns, rows)
        }
        None => {
            if sheet.headers_row > grid.len() {
                return Err(IngestError::HeaderRowOutOfRange {
                    sheet: source_name.to_string(),
                    row: sheet.headers_row,
                    rows: grid.len(),
                });
            }
            let headers = grid[sheet.headers_row - 1]
                .iter()
                .map(|cell| normalize_text(cell))
                .collect();
            let rows = grid
                .iter()
                .enumerate()
                .map(|(idx, row)| (idx + 1, row))
                .filter(|(number, _)| *number >= sheet.data_start_row && !skip.contains(number))
                .map(|(_, row)| row.iter().map(|c| normalize_cell(c)).collect())
                .collect();
            (headers, rows)
        }
    };

    build_frame(headers, data)
}

/// Assembles string columns from a header and rows.
///
/// Blank header cells become `column_{n}` (1-based position) unless the whole
/// column is empty, in which case it is dropped. Repeated names get `.1`,
/// `.2`, ... suffixes.
pub fn build_frame(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<DataFrame> {
    let width = headers.len();
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .filter(|row| row.iter().take(width).any(|c| !c.trim().is_empty()))
        .collect();

    let mut names: Vec<String> = Vec::with_capacity(width);
    let mut columns: Vec<Column> = Vec::with_capacity(width);
    for (idx, header) in headers.into_iter().enumerate() {
        let values: Vec<Option<String>> = rows
            .iter()
            .map(|row| {
                row.get(idx)
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
            })
            .collect();
        let header = header.trim().to_string();
        if header.is_empty() && values.iter().all(Option::is_none) {
            continue;
        }
        let base = if header.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            header
        };
        let name = unique_name(&base, &names);
        columns.push(string_column(&name, values));
        names.push(name);
    }
    Ok(DataFrame::new(columns)?)
}

fn unique_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|n| n == base) {
        return base.to_string();
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{base}.{suffix}");
        if !taken.iter().any(|n| *n == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    #[test]
    fn header_row_and_skip_rows_use_file_row_numbers() {
        let raw = grid(&[
            &["Report", ""],
            &["id", "amount"],
            &["1", "10"],
            &["2", "20"],
            &["3", "30"],
        ]);
        let mut sheet = SheetConfig::default_layout("s");
        sheet.headers_row = 2;
        sheet.data_start_row = 3;
        sheet.skip_rows = vec![4];
        let df = frame_from_grid(&raw, &sheet, "s").unwrap();
        let ids: Vec<Option<&str>> = df.column("id").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some("1"), Some("3")]);
    }

    #[test]
    fn blank_and_duplicate_headers_are_named() {
        let df = build_frame(
            vec!["a".into(), "".into(), "a".into(), "".into()],
            vec![vec!["1".into(), "2".into(), "3".into(), "".into()]],
        )
        .unwrap();
        let names: Vec<String> = df
            .get_column_names_owned()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["a", "column_2", "a.1"]);
    }

    #[test]
    fn empty_rows_are_dropped_and_empty_cells_are_null() {
        let df = build_frame(
            vec!["a".into(), "b".into()],
            vec![
                vec!["".into(), " ".into()],
                vec!["x".into(), "".into()],
            ],
        )
        .unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn header_past_end_is_an_error() {
        let raw = grid(&[&["a"]]);
        let mut sheet = SheetConfig::default_layout("s");
        sheet.headers_row = 3;
        sheet.data_start_row = 4;
        let err = frame_from_grid(&raw, &sheet, "s").unwrap_err();
        assert!(matches!(err, IngestError::HeaderRowOutOfRange { .. }));
    }
}
