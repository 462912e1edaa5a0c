//! Format readers.
//!
//! Each reader turns one partner file into named, string-typed tables. The
//! [`crate::FormatDispatcher`] picks the first registered reader whose
//! [`FormatReader::can_parse`] accepts the path.

mod delimited;
mod json;
mod spreadsheet;

use std::path::Path;

use mapline_model::SourceConfig;
use polars::prelude::DataFrame;

use crate::error::{IngestError, Result};

pub use delimited::{DelimitedReader, decode_text, detect_delimiter};
pub use json::JsonRecordsReader;
pub use spreadsheet::{SpreadsheetReader, excel_serial_to_string};

/// A table read from a file, keyed by sheet name or file stem.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: String,
    pub frame: DataFrame,
}

/// A sheet that could not be read while the rest of the file was.
#[derive(Debug)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: IngestError,
}

/// Everything a reader produced for one file.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub tables: Vec<NamedTable>,
    pub failures: Vec<SheetFailure>,
}

/// Capability interface for file readers.
pub trait FormatReader: Send + Sync {
    /// Short reader name for logs.
    fn name(&self) -> &'static str;

    /// Lowercase extensions without the dot.
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Extension-based check; does not open the file.
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }

    /// Read all tables the source config asks for.
    fn read(&self, path: &Path, source: &SourceConfig) -> Result<ReadOutcome>;
}

/// File stem as a string, falling back to the full name.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
