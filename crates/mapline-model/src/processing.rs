//! Per-file and per-partner processing results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationResult;

/// Lifecycle of one partner file.
///
/// Files move forward through the stages and end `Accepted` or `Rejected`;
/// fatal errors reject a file from whatever stage it reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    #[default]
    Discovered,
    Parsed,
    Mapped,
    Transformed,
    Filtered,
    Validated,
    Accepted,
    Rejected,
}

impl FileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileState::Accepted | FileState::Rejected)
    }
}

/// One sheet/table produced from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    /// Sheet name or file stem the table came from.
    pub source: String,
    pub target_table: String,
    pub rows_read: usize,
    /// Rows remaining after mapping, transformations and filters.
    pub rows_out: usize,
    /// Rows handed to the destination store (0 on dry runs).
    pub rows_stored: usize,
    pub validation: Option<ValidationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Hex SHA-256 of the file contents.
    pub fingerprint: Option<String>,
    pub state: FileState,
    pub tables: Vec<TableReport>,
    pub records_processed: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fingerprint: None,
            state: FileState::Discovered,
            tables: Vec::new(),
            records_processed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Move to a later stage. Terminal states are never left.
    pub fn advance(&mut self, state: FileState) {
        if !self.state.is_terminal() {
            self.state = state;
        }
    }

    pub fn reject(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.state = FileState::Rejected;
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerReport {
    pub partner_id: String,
    pub success: bool,
    pub files_processed: usize,
    pub records_processed: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub files: Vec<FileReport>,
}

impl PartnerReport {
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            success: true,
            files_processed: 0,
            records_processed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.success = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Fold a finished file into the partner totals.
    ///
    /// File messages are prefixed with the file name so the partner-level
    /// lists stay readable on their own.
    pub fn push_file(&mut self, file: FileReport) {
        let name = file.file_name();
        if file.state == FileState::Accepted {
            self.files_processed += 1;
        }
        self.records_processed += file.records_processed;
        for error in &file.errors {
            self.add_error(format!("{name}: {error}"));
        }
        for warning in &file.warnings {
            self.add_warning(format!("{name}: {warning}"));
        }
        self.files.push(file);
    }
}

/// Aggregate over every partner processed in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub partners: Vec<PartnerReport>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.partners.iter().any(|p| !p.errors.is_empty())
    }

    pub fn total_records(&self) -> usize {
        self.partners.iter().map(|p| p.records_processed).sum()
    }

    pub fn total_files(&self) -> usize {
        self.partners.iter().map(|p| p.files_processed).sum()
    }
}
