//! Extension-based reader selection.

use std::path::Path;

use mapline_model::SourceConfig;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::readers::{
    DelimitedReader, FormatReader, JsonRecordsReader, ReadOutcome, SpreadsheetReader,
};

/// Ordered list of readers; the first one that accepts a path wins.
pub struct FormatDispatcher {
    readers: Vec<Box<dyn FormatReader>>,
}

impl Default for FormatDispatcher {
    /// Spreadsheet, delimited text, then JSON records.
    fn default() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(Box::new(SpreadsheetReader));
        dispatcher.register(Box::new(DelimitedReader));
        dispatcher.register(Box::new(JsonRecordsReader));
        dispatcher
    }
}

impl FormatDispatcher {
    /// A dispatcher with no readers registered.
    pub fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Append a reader; earlier registrations take precedence.
    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        debug!(reader = reader.name(), "registered reader");
        self.readers.push(reader);
    }

    /// Registered readers in precedence order.
    pub fn readers(&self) -> &[Box<dyn FormatReader>] {
        &self.readers
    }

    pub fn reader_names(&self) -> Vec<&'static str> {
        self.readers.iter().map(|r| r.name()).collect()
    }

    /// First reader whose `can_parse` accepts `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFormat`] when no reader accepts it.
    pub fn reader_for(&self, path: &Path) -> Result<&dyn FormatReader> {
        self.readers
            .iter()
            .find(|reader| reader.can_parse(path))
            .map(Box::as_ref)
            .ok_or_else(|| IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                supported: self.supported_extensions().join(", "),
            })
    }

    pub fn can_parse(&self, path: &Path) -> bool {
        self.readers.iter().any(|reader| reader.can_parse(path))
    }

    /// Sorted, de-duplicated union of every reader's extensions.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .readers
            .iter()
            .flat_map(|r| r.supported_extensions().iter().map(|e| (*e).to_string()))
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }

    /// Read a file with the reader selected for it.
    pub fn read(&self, path: &Path, source: &SourceConfig) -> Result<ReadOutcome> {
        let reader = self.reader_for(path)?;
        debug!(file = %path.display(), reader = reader.name(), "dispatching file");
        reader.read(path, source)
    }
}
