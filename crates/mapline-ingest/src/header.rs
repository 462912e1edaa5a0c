//! Header row location for sheets whose header position is not fixed.
//!
//! Partner exports often carry banner rows, report titles or blank lines
//! above the real header. Given the expected header names, every row of the
//! raw grid is scored by how many cells match the expected name in the same
//! position; the best row becomes the header.

use crate::error::{IngestError, Result};

/// Normalizes a header or cell text for comparison.
///
/// Literal `\n` escape sequences, newlines, carriage returns and tabs become
/// spaces, runs of whitespace collapse to one space, and the result is trimmed.
/// A leading byte-order mark is dropped.
///
/// # Examples
///
/// ```
/// use mapline_ingest::normalize_text;
///
/// assert_eq!(normalize_text("  Order\\nDate "), "Order Date");
/// assert_eq!(normalize_text("Net\r\n\tAmount"), "Net Amount");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let replaced = raw
        .trim_start_matches('\u{feff}')
        .replace("\\n", " ")
        .replace(['\n', '\r', '\t'], " ");
    let mut out = String::with_capacity(replaced.len());
    for part in replaced.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

/// The row chosen as header and the data beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedTable {
    /// 0-based index of the header row in the input grid.
    pub header_index: usize,
    /// Number of positional matches on the header row.
    pub score: usize,
    /// Column names: the expected names, then the row's own cells beyond them.
    pub columns: Vec<String>,
    /// Normalized rows after the header, padded or truncated to `columns`.
    pub rows: Vec<Vec<String>>,
}

/// Scores one row against the expected header list.
pub fn score_row(row: &[String], expected: &[String]) -> usize {
    row.iter()
        .zip(expected)
        .filter(|(cell, want)| normalize_text(cell) == normalize_text(want))
        .count()
}

/// Finds the 0-based index of the best header row.
///
/// The strictly highest score wins, so ties go to the earliest row.
///
/// # Errors
///
/// Returns [`IngestError::HeaderNotFound`] when no row matches any expected
/// name in its position.
pub fn find_header_index(grid: &[Vec<String>], expected: &[String]) -> Result<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, row) in grid.iter().enumerate() {
        let score = score_row(row, expected);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((idx, score));
        }
    }
    best.ok_or(IngestError::HeaderNotFound { source_name: None })
}

/// Locates the header row and returns the cleaned table beneath it.
///
/// # Errors
///
/// Returns [`IngestError::HeaderNotFound`] when no row scores above zero.
pub fn locate_header(grid: &[Vec<String>], expected: &[String]) -> Result<LocatedTable> {
    let (header_index, score) = find_header_index(grid, expected)?;
    let header_row = &grid[header_index];

    let mut columns: Vec<String> = expected.iter().map(|name| normalize_text(name)).collect();
    for cell in header_row.iter().skip(expected.len()) {
        columns.push(normalize_text(cell));
    }
    // Trailing cells beyond the expected names without text carry no column.
    while columns.len() > expected.len() && columns.last().is_some_and(String::is_empty) {
        columns.pop();
    }

    let rows = grid[header_index + 1..]
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|c| normalize_text(c)).collect();
            cells.resize(columns.len(), String::new());
            cells
        })
        .collect();

    Ok(LocatedTable {
        header_index,
        score,
        columns,
        rows,
    })
}
