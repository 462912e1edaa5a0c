//! Partner file ingestion.
//!
//! Turns raw partner files into located, string-typed tables: readers handle
//! the physical format, the layout module applies header and skip-row rules,
//! and the header locator finds headers that drift between exports.

pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod header;
pub mod layout;
pub mod readers;

pub use discovery::{discover_partner_files, find_partner_dir, list_data_files};
pub use dispatch::FormatDispatcher;
pub use error::{IngestError, Result};
pub use header::{LocatedTable, find_header_index, locate_header, normalize_text, score_row};
pub use layout::{build_frame, frame_from_grid, normalize_cell};
pub use readers::{
    DelimitedReader, FormatReader, JsonRecordsReader, NamedTable, ReadOutcome, SheetFailure,
    SpreadsheetReader, decode_text, detect_delimiter, excel_serial_to_string,
};
