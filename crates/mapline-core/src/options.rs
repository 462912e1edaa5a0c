//! Run-level options.

use serde::Serialize;

use crate::store::DEFAULT_BATCH_SIZE;

pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Knobs that apply to every partner in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    /// Validate and report, never store.
    pub dry_run: bool,
    pub batch_size: usize,
    pub max_workers: usize,
    pub enable_validation: bool,
    /// Store tables even when validation reports errors; the errors are
    /// reported as warnings instead.
    pub tolerate_invalid: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_workers: DEFAULT_MAX_WORKERS,
            enable_validation: true,
            tolerate_invalid: false,
        }
    }
}

impl RunOptions {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    pub fn with_tolerate_invalid(mut self, tolerate: bool) -> Self {
        self.tolerate_invalid = tolerate;
        self
    }
}
