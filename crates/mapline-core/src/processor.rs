//! Partner run orchestration.
//!
//! For every partner: load its configuration, discover its files, and push
//! each file through read → map/transform/filter → validate → store. A file
//! is stored only when every one of its sheets passes. Files run on a
//! bounded worker pool; one file's failure never stops the others.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{Span, debug, error, info, info_span, warn};

use mapline_ingest::{FormatDispatcher, IngestError, NamedTable, discover_partner_files};
use mapline_model::{
    FileReport, FileState, PartnerConfig, PartnerReport, RunReport, TableReport, ValidationResult,
};
use mapline_transform::transform_sheet;
use mapline_validate::{RuleEngine, Validator};

use crate::config_store::ConfigStore;
use crate::error::PipelineError;
use crate::fingerprint::sha256_file;
use crate::options::RunOptions;
use crate::pool::run_indexed;
use crate::store::DestinationStore;

/// Drives partner runs against a config store and a destination store.
pub struct PartnerProcessor<'a> {
    configs: &'a dyn ConfigStore,
    store: &'a dyn DestinationStore,
    data_dir: PathBuf,
    dispatcher: FormatDispatcher,
    validator: Box<dyn Validator>,
    options: RunOptions,
}

impl<'a> PartnerProcessor<'a> {
    pub fn new(
        configs: &'a dyn ConfigStore,
        store: &'a dyn DestinationStore,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            configs,
            store,
            data_dir: data_dir.into(),
            dispatcher: FormatDispatcher::default(),
            validator: Box::new(RuleEngine::new()),
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: FormatDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn dispatcher(&self) -> &FormatDispatcher {
        &self.dispatcher
    }

    /// Prepare the destination store. Skipped on dry runs.
    pub fn create_schema(&self) -> Result<(), PipelineError> {
        if self.options.dry_run {
            info!("dry run: skipping schema creation");
            return Ok(());
        }
        self.store.create_schema()?;
        Ok(())
    }

    /// Process every partner the config store knows, in id order.
    ///
    /// # Errors
    ///
    /// Fails only when the partner list itself cannot be read.
    pub fn process_all(&self) -> Result<RunReport, PipelineError> {
        let partner_ids = self.configs.list()?;
        info!(partner_count = partner_ids.len(), "processing all partners");
        let partners = partner_ids
            .iter()
            .map(|id| self.process_partner(id))
            .collect();
        Ok(RunReport {
            dry_run: self.options.dry_run,
            partners,
        })
    }

    /// Load a partner's configuration and process its files.
    pub fn process_partner(&self, partner_id: &str) -> PartnerReport {
        match self.configs.load(partner_id) {
            Ok(config) => self.process_config(&config),
            Err(err) => {
                error!(partner_id = %partner_id, error = %err, "failed to load configuration");
                let mut report = PartnerReport::new(partner_id);
                report.add_error(format!("Failed to process partner {partner_id}: {err}"));
                report
            }
        }
    }

    /// Process a partner's files with an already loaded configuration.
    pub fn process_config(&self, config: &PartnerConfig) -> PartnerReport {
        let partner_id = config.partner_id.as_str();
        let partner_span = info_span!("partner", partner_id = %partner_id);
        let _guard = partner_span.enter();
        let start = Instant::now();
        let mut report = PartnerReport::new(partner_id);

        for warning in config.lint() {
            warn!(partner_id = %partner_id, "{warning}");
            report.add_warning(format!("config: {warning}"));
        }

        let files = match discover_partner_files(&self.data_dir, partner_id) {
            Ok(files) => files,
            Err(err) => {
                error!(partner_id = %partner_id, error = %err, "file discovery failed");
                report.add_error(format!("Failed to process partner {partner_id}: {err}"));
                return report;
            }
        };
        if files.is_empty() {
            warn!(partner_id = %partner_id, "no data files found");
            report.add_warning("No data files found");
            return report;
        }
        info!(partner_id = %partner_id, file_count = files.len(), "processing partner files");

        let parent = Span::current();
        let file_reports = run_indexed(&files, self.options.max_workers, |_, path| {
            self.process_file(config, path, &parent)
        });
        for file in file_reports {
            report.push_file(file);
        }

        if report.success {
            info!(
                partner_id = %partner_id,
                files_processed = report.files_processed,
                records_processed = report.records_processed,
                duration_ms = start.elapsed().as_millis(),
                "partner processed"
            );
        } else {
            error!(
                partner_id = %partner_id,
                error_count = report.errors.len(),
                "partner processed with errors"
            );
        }
        report
    }

    /// Run one file through the whole pipeline.
    pub fn process_file(&self, config: &PartnerConfig, path: &Path, parent: &Span) -> FileReport {
        let mut report = FileReport::new(path);
        let file_name = report.file_name();
        let span = info_span!(parent: parent, "file", file = %file_name);
        let _guard = span.enter();
        let start = Instant::now();

        match sha256_file(path) {
            Ok(fingerprint) => report.fingerprint = Some(fingerprint),
            Err(err) => {
                report.reject(format!("failed to read file: {err}"));
                return report;
            }
        }

        let outcome = match self.dispatcher.read(path, &config.source_config) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(file = %file_name, error = %err, "failed to read file");
                report.reject(err.to_string());
                return report;
            }
        };
        report.advance(FileState::Parsed);

        for failure in outcome.failures {
            match failure.error {
                err @ IngestError::SheetNotFound { .. } => {
                    warn!(sheet = %failure.sheet, "configured sheet not found");
                    report.warnings.push(err.to_string());
                }
                err => {
                    error!(sheet = %failure.sheet, error = %err, "failed to read sheet");
                    report.errors.push(format!("sheet '{}': {err}", failure.sheet));
                }
            }
        }

        let pending: Vec<PendingTable> = outcome
            .tables
            .into_iter()
            .filter_map(|table| self.process_table(config, table, &mut report))
            .collect();

        if report.errors.is_empty() {
            self.store_file(pending, &mut report);
        } else if !pending.is_empty() {
            warn!(
                file = %file_name,
                tables = pending.len(),
                "file rejected: nothing stored"
            );
        }

        if report.errors.is_empty() {
            report.advance(FileState::Accepted);
        } else {
            report.advance(FileState::Rejected);
        }
        debug!(
            file = %file_name,
            state = ?report.state,
            records = report.records_processed,
            duration_ms = start.elapsed().as_millis(),
            "file processed"
        );
        report
    }

    /// Stores every table of a file that passed all of its sheets.
    ///
    /// Records count toward the file only once all of its tables are stored.
    fn store_file(&self, pending: Vec<PendingTable>, report: &mut FileReport) {
        let mut records = 0;
        for table in pending {
            if self.options.dry_run {
                info!(table = %table.target, rows = table.frame.height(), "dry run: not storing");
            } else if table.frame.height() > 0 {
                match self
                    .store
                    .insert(&table.target, &table.frame, self.options.batch_size)
                {
                    Ok(stored) => report.tables[table.report_index].rows_stored = stored,
                    Err(err) => {
                        error!(table = %table.target, error = %err, "failed to store table");
                        report
                            .errors
                            .push(format!("Failed to store table '{}': {err}", table.target));
                        return;
                    }
                }
            }
            records += table.frame.height();
        }
        report.records_processed += records;
    }

    /// Maps, filters, and validates one table, recording it on the file
    /// report. Returns the table when it is ready to store.
    fn process_table(
        &self,
        config: &PartnerConfig,
        table: NamedTable,
        report: &mut FileReport,
    ) -> Option<PendingTable> {
        let NamedTable { name, frame } = table;
        let Some(sheet) = config.source_config.sheet_for(&name) else {
            warn!(source = %name, "no sheet configuration matches, skipping");
            report
                .warnings
                .push(format!("No sheet configuration matches '{name}', skipped"));
            return None;
        };

        let outcome = match transform_sheet(
            &frame,
            sheet,
            &config.source_config.global_transformations,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(source = %name, error = %err, "failed to map sheet");
                report.errors.push(format!("sheet '{name}': {err}"));
                return None;
            }
        };
        if frame.width() == 0 {
            warn!(source = %name, "sheet has no data");
            report.warnings.push(format!("Sheet '{name}' has no data"));
        }
        report.advance(FileState::Mapped);
        report.advance(FileState::Transformed);
        report.advance(FileState::Filtered);
        report
            .warnings
            .extend(outcome.warnings.iter().map(|w| format!("{name}: {w}")));

        let target = sheet.target_table.as_str();
        let mut table_report = TableReport {
            source: name,
            target_table: target.to_string(),
            rows_read: outcome.rows_in,
            rows_out: outcome.rows_out,
            rows_stored: 0,
            validation: None,
        };

        let mut rejected = false;
        if self.options.enable_validation {
            let result = self.validator.validate(&outcome.frame, target);
            report.advance(FileState::Validated);
            report
                .warnings
                .extend(result.warnings.iter().map(|w| format!("{target}: {w}")));
            rejected = result.has_errors() && !self.options.tolerate_invalid;
            if result.has_errors() {
                let summary = summarize_errors(&result);
                if rejected {
                    error!(table = %target, errors = result.error_count(), "validation failed");
                    report
                        .errors
                        .push(format!("Validation failed for table '{target}': {summary}"));
                } else {
                    warn!(table = %target, errors = result.error_count(), "validation errors tolerated");
                    report
                        .warnings
                        .push(format!("Validation errors tolerated for table '{target}': {summary}"));
                }
            }
            table_report.validation = Some(result);
        }

        report.tables.push(table_report);
        if rejected {
            return None;
        }
        Some(PendingTable {
            target: target.to_string(),
            frame: outcome.frame,
            report_index: report.tables.len() - 1,
        })
    }
}

/// A validated table waiting for the rest of its file.
struct PendingTable {
    target: String,
    frame: DataFrame,
    report_index: usize,
}

fn summarize_errors(result: &ValidationResult) -> String {
    result
        .errors
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
