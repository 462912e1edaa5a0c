use thiserror::Error;

/// Structural failures while mapping a sheet.
///
/// Per-value problems never produce an error; they degrade to null or the
/// column default instead.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Required column '{source_column}' not found (maps to '{system_column}') and no default provided")]
    RequiredColumnMissing {
        source_column: String,
        system_column: String,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
