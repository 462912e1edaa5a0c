//! Error types for partner file ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating and reading partner files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Format Errors ===
    /// No registered reader accepts the file.
    #[error("unsupported file format: {path} (supported: {supported})")]
    UnsupportedFormat { path: PathBuf, supported: String },

    /// Encoding label not recognized.
    #[error("unknown encoding '{label}' for {path}")]
    UnknownEncoding { path: PathBuf, label: String },

    /// Delimited text could not be parsed.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Workbook could not be opened or a sheet could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Structured text could not be parsed into records.
    #[error("failed to parse JSON records in {path}: {message}")]
    JsonParse { path: PathBuf, message: String },

    // === Layout Errors ===
    /// A configured sheet does not exist in the workbook.
    #[error("sheet '{sheet}' not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    /// No row matched any expected header name.
    #[error("could not locate a header row matching the expected columns{}", describe_source(.source_name))]
    HeaderNotFound { source_name: Option<String> },

    /// The configured header row is past the end of the data.
    #[error("header row {row} is beyond the last row ({rows}) of '{sheet}'")]
    HeaderRowOutOfRange {
        sheet: String,
        row: usize,
        rows: usize,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

fn describe_source(source: &Option<String>) -> String {
    match source {
        Some(name) => format!(" in '{name}'"),
        None => String::new(),
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::SheetNotFound {
            path: PathBuf::from("/data/acme/orders.xlsx"),
            sheet: "Payments".into(),
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Payments' not found in /data/acme/orders.xlsx"
        );
        let err = IngestError::HeaderNotFound {
            source_name: Some("Orders".into()),
        };
        assert_eq!(
            err.to_string(),
            "could not locate a header row matching the expected columns in 'Orders'"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
