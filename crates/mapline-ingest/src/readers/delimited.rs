use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::Encoding;
use mapline_model::{SheetConfig, SourceConfig};
use tracing::debug;

use super::{FormatReader, NamedTable, ReadOutcome, file_name, file_stem, read_bytes};
use crate::error::{IngestError, Result};
use crate::layout::frame_from_grid;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Reader for comma, semicolon, tab or pipe separated text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedReader;

impl FormatReader for DelimitedReader {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["csv", "tsv", "txt"]
    }

    fn read(&self, path: &Path, source: &SourceConfig) -> Result<ReadOutcome> {
        let bytes = read_bytes(path)?;
        let text = decode_text(path, &bytes, &source.encoding)?;
        let delimiter = detect_delimiter(&text);
        let grid = read_grid(path, &text, delimiter)?;

        let name = file_stem(path);
        let full_name = file_name(path);
        let sheet = source
            .sheet_for(&full_name)
            .or_else(|| source.sheet_for(&name))
            .cloned()
            .unwrap_or_else(|| SheetConfig::default_layout(&name));
        debug!(
            file = %path.display(),
            delimiter = %char::from(delimiter).escape_default(),
            rows = grid.len(),
            "read delimited file"
        );

        let frame = frame_from_grid(&grid, &sheet, &name)?;
        Ok(ReadOutcome {
            tables: vec![NamedTable { name, frame }],
            failures: Vec::new(),
        })
    }
}

/// Decodes file bytes with the given encoding label.
///
/// A byte-order mark overrides the label.
pub fn decode_text(path: &Path, bytes: &[u8], label: &str) -> Result<String> {
    let encoding =
        Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncoding {
            path: path.to_path_buf(),
            label: label.to_string(),
        })?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(
            file = %path.display(),
            encoding = used.name(),
            "replaced malformed byte sequences while decoding"
        );
    }
    Ok(text.into_owned())
}

/// Picks the delimiter occurring most often on the first line.
///
/// Ties resolve in the order `,` `;` tab `|`; a line with none of them
/// falls back to a comma.
///
/// # Examples
///
/// ```
/// use mapline_ingest::detect_delimiter;
///
/// assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
/// assert_eq!(detect_delimiter("single"), b',');
/// ```
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or_default();
    let mut best = (b',', 0usize);
    for candidate in DELIMITER_CANDIDATES {
        let count = first_line.bytes().filter(|b| *b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Reads records into a grid indexed by physical line number.
///
/// The CSV parser skips blank lines, so rows are placed by the line on
/// which each record starts and gaps are filled with empty rows.
pub(crate) fn read_grid(path: &Path, text: &str, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let line = record
            .position()
            .and_then(|pos| usize::try_from(pos.byte()).ok())
            .map_or(grid.len() + 1, |byte| physical_line(text, byte));
        while grid.len() + 1 < line {
            grid.push(Vec::new());
        }
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// 1-based line of the first non-blank byte at or after `byte`.
///
/// Record positions may point at the blank lines skipped before a record.
fn physical_line(text: &str, byte: usize) -> usize {
    let bytes = text.as_bytes();
    let mut start = byte.min(bytes.len());
    while start < bytes.len() && matches!(bytes[start], b'\n' | b'\r') {
        start += 1;
    }
    bytes[..start].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tie_prefers_comma() {
        assert_eq!(detect_delimiter("a,b;c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc|d"), b'\t');
    }

    #[test]
    fn blank_lines_keep_row_numbers() {
        let grid = read_grid(Path::new("x.csv"), "title\n\nid,name\n1,a\n", b',').unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid[1].iter().all(String::is_empty));
        assert_eq!(grid[2], vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn blank_lines_before_the_header_keep_row_numbers() {
        let text = "Weekly report\r\n\r\n\r\nOrder ID,Status\r\nA1,delivered\r\n\r\nA2,pending\r\n";
        let grid = read_grid(Path::new("x.csv"), text, b',').unwrap();
        assert_eq!(grid.len(), 7);
        assert_eq!(grid[0], vec!["Weekly report".to_string()]);
        assert!(grid[1].is_empty() && grid[2].is_empty());
        assert_eq!(grid[3], vec!["Order ID".to_string(), "Status".to_string()]);
        assert!(grid[5].is_empty());
        assert_eq!(grid[6], vec!["A2".to_string(), "pending".to_string()]);
    }

    #[test]
    fn physical_line_skips_leading_blank_lines() {
        let text = "a\n\n\nb\n";
        assert_eq!(physical_line(text, 0), 1);
        assert_eq!(physical_line(text, 2), 4);
        assert_eq!(physical_line(text, 4), 4);
    }

    #[test]
    fn decodes_windows_1252() {
        let text = decode_text(Path::new("x.csv"), b"caf\xe9", "windows-1252").unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn unknown_encoding_is_reported() {
        let err = decode_text(Path::new("x.csv"), b"a", "no-such-encoding").unwrap_err();
        assert!(matches!(err, IngestError::UnknownEncoding { .. }));
    }

    proptest! {
        #[test]
        fn records_land_on_their_physical_line(
            lines in prop::collection::vec(
                prop::option::of("[a-z]{1,4}(,[a-z0-9]{1,3}){0,2}"),
                1..12,
            ),
        ) {
            let text: String = lines
                .iter()
                .map(|line| format!("{}\n", line.as_deref().unwrap_or("")))
                .collect();
            let grid = read_grid(Path::new("x.csv"), &text, b',').unwrap();
            for (idx, line) in lines.iter().enumerate() {
                match line {
                    Some(line) => prop_assert_eq!(&grid[idx].join(","), line),
                    None => prop_assert!(grid.get(idx).is_none_or(Vec::is_empty)),
                }
            }
        }

        #[test]
        fn detected_delimiter_is_a_candidate(text in "[a-z,;\t|\n]{0,40}") {
            prop_assert!(DELIMITER_CANDIDATES.contains(&detect_delimiter(&text)));
        }
    }
}
