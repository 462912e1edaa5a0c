//! Orchestration of partner runs.
//!
//! [`PartnerProcessor`] ties the pieces together: a [`ConfigStore`] supplies
//! partner configurations, the ingest dispatcher reads files, the transform
//! pipeline shapes tables, a validator checks them, and a
//! [`DestinationStore`] receives the accepted tables.

pub mod config_store;
pub mod error;
pub mod fingerprint;
pub mod options;
pub mod pool;
pub mod processor;
pub mod store;

pub use config_store::{ConfigStore, JsonConfigStore};
pub use error::{ConfigStoreError, PipelineError, StorageError};
pub use fingerprint::sha256_file;
pub use options::{DEFAULT_MAX_WORKERS, RunOptions};
pub use pool::run_indexed;
pub use processor::PartnerProcessor;
pub use store::{CsvDirectoryStore, DEFAULT_BATCH_SIZE, DestinationStore, MemoryStore, batch_ranges};
