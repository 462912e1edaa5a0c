use serde::Serialize;
use thiserror::Error;

/// One violated configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path to the field, e.g. `source_config.sheets_config[0].target_table`.
    pub path: String,
    pub message: String,
}

/// A partner configuration failed validation.
///
/// Carries every violation found, in document order.
#[derive(Debug, Clone, Error)]
#[error("invalid partner configuration: {}", join_errors(.errors))]
pub struct ConfigValidationError {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Default)]
pub(crate) struct ErrorCollector {
    errors: Vec<FieldError>,
}

impl ErrorCollector {
    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Succeeds only when a value was produced and nothing was reported.
    pub(crate) fn finish_parsed<T>(mut self, value: Option<T>) -> Result<T, ConfigValidationError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => {
                if self.errors.is_empty() {
                    self.push("", "invalid configuration");
                }
                Err(ConfigValidationError {
                    errors: self.errors,
                })
            }
        }
    }
}
