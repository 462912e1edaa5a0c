//! Error types for orchestration collaborators.

use std::path::PathBuf;

use mapline_model::ConfigValidationError;
use thiserror::Error;

/// Failures of a destination store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to insert into '{table}': {message}")]
    Insert { table: String, message: String },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures while loading partner configurations.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("invalid partner id: {message}")]
    InvalidPartnerId { message: String },

    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigValidationError,
    },
}

/// Failures that stop a run before any partner is processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigStoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
