use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use mapline_common::format_numeric;
use mapline_model::SourceConfig;
use tracing::{debug, warn};

use super::{FormatReader, NamedTable, ReadOutcome, SheetFailure};
use crate::error::{IngestError, Result};
use crate::layout::frame_from_grid;

/// Reader for spreadsheet workbooks.
///
/// Reads every configured sheet; sheets missing from the workbook or failing
/// layout are reported individually while the rest continue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetReader;

impl FormatReader for SpreadsheetReader {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xlsm", "xlsb", "xls", "ods"]
    }

    fn read(&self, path: &Path, source: &SourceConfig) -> Result<ReadOutcome> {
        let mut workbook = open_workbook_auto(path).map_err(|err| IngestError::Workbook {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let sheet_names = workbook.sheet_names();
        debug!(file = %path.display(), sheets = sheet_names.len(), "opened workbook");

        let mut outcome = ReadOutcome::default();
        for sheet in &source.sheets_config {
            let Some(actual) = resolve_sheet_name(&sheet_names, &sheet.sheet_name) else {
                warn!(file = %path.display(), sheet = %sheet.sheet_name, "sheet not found");
                outcome.failures.push(SheetFailure {
                    sheet: sheet.sheet_name.clone(),
                    error: IngestError::SheetNotFound {
                        path: path.to_path_buf(),
                        sheet: sheet.sheet_name.clone(),
                    },
                });
                continue;
            };
            let range = match workbook.worksheet_range(&actual) {
                Ok(range) => range,
                Err(err) => {
                    outcome.failures.push(SheetFailure {
                        sheet: sheet.sheet_name.clone(),
                        error: IngestError::Workbook {
                            path: path.to_path_buf(),
                            message: format!("sheet '{actual}': {err}"),
                        },
                    });
                    continue;
                }
            };
            let grid = range_to_grid(&range);
            match frame_from_grid(&grid, sheet, &sheet.sheet_name) {
                Ok(frame) => outcome.tables.push(NamedTable {
                    name: sheet.sheet_name.clone(),
                    frame,
                }),
                Err(error) => outcome.failures.push(SheetFailure {
                    sheet: sheet.sheet_name.clone(),
                    error,
                }),
            }
        }
        Ok(outcome)
    }
}

/// Exact name first, then a trimmed case-insensitive match.
fn resolve_sheet_name(available: &[String], wanted: &str) -> Option<String> {
    if let Some(found) = available.iter().find(|name| name.as_str() == wanted) {
        return Some(found.clone());
    }
    let wanted = wanted.trim();
    available
        .iter()
        .find(|name| name.trim().eq_ignore_ascii_case(wanted))
        .cloned()
}

/// Expands a calamine range into a grid anchored at cell A1, so grid rows
/// line up with the workbook's row numbers.
fn range_to_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    let (start_row, start_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));
    let mut grid: Vec<Vec<String>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }
    grid
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_numeric(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Converts an Excel serial date to `YYYY-MM-DD`, adding the time of day
/// as `HH:MM:SS` when the serial has a fractional part.
///
/// # Examples
///
/// ```
/// use mapline_ingest::excel_serial_to_string;
///
/// assert_eq!(excel_serial_to_string(45292.0), "2024-01-01");
/// assert_eq!(excel_serial_to_string(45292.5), "2024-01-01 12:00:00");
/// ```
pub fn excel_serial_to_string(serial: f64) -> String {
    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return format_numeric(serial);
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    let Some(datetime) =
        Duration::try_milliseconds(millis).and_then(|delta| base.checked_add_signed(delta))
    else {
        return format_numeric(serial);
    };
    if serial.fract() == 0.0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_sheet_case_insensitively() {
        let names = vec!["Orders ".to_string(), "Payments".to_string()];
        assert_eq!(
            resolve_sheet_name(&names, "orders"),
            Some("Orders ".to_string())
        );
        assert_eq!(resolve_sheet_name(&names, "Refunds"), None);
    }

    #[test]
    fn cell_formatting() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(12.25)), "12.25");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
