//! Resolved application settings.

use std::path::PathBuf;

use anyhow::{Result, bail};
use mapline_core::{CsvDirectoryStore, JsonConfigStore, RunOptions};
use serde::Serialize;

use crate::cli::SettingsArgs;

/// Directories and run options for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub configs_dir: PathBuf,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub options: RunOptions,
}

impl AppConfig {
    /// Build settings from parsed flags.
    ///
    /// # Errors
    ///
    /// Rejects a zero batch size or worker count.
    pub fn from_args(args: &SettingsArgs) -> Result<Self> {
        if args.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        if args.max_workers == 0 {
            bail!("--max-workers must be at least 1");
        }
        let options = RunOptions::default()
            .with_dry_run(args.dry_run)
            .with_batch_size(args.batch_size)
            .with_max_workers(args.max_workers)
            .with_validation(!args.no_validation)
            .with_tolerate_invalid(args.tolerate_invalid);
        Ok(Self {
            configs_dir: args.configs_dir.clone(),
            data_dir: args.data_dir.clone(),
            output_dir: args.output_dir.clone(),
            options,
        })
    }

    pub fn config_store(&self) -> JsonConfigStore {
        JsonConfigStore::new(&self.configs_dir)
    }

    pub fn destination(&self) -> CsvDirectoryStore {
        CsvDirectoryStore::new(&self.output_dir)
    }
}
