use serde::{Deserialize, Serialize};

/// A blocking validation problem, optionally tied to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: Option<String>,
    pub message: String,
}

/// Outcome of validating one mapped table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<String>,
    pub row_count: usize,
    pub column_count: usize,
}

impl ValidationResult {
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            row_count,
            column_count,
        }
    }

    pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.map(str::to_string),
            message: message.into(),
        });
        self.valid = false;
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
