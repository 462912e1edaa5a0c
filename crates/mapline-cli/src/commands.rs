//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span, warn};

use mapline_core::{ConfigStore, ConfigStoreError, JsonConfigStore, PartnerProcessor};
use mapline_ingest::FormatDispatcher;
use mapline_model::{PartnerConfig, RunReport};

use crate::settings::AppConfig;

/// Outcome of checking one configuration file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigCheck {
    /// Partner id, or the file path when the id could not be read.
    pub name: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigCheck {
    fn from_result(name: String, result: Result<PartnerConfig, ConfigStoreError>) -> Self {
        match result {
            Ok(config) => Self {
                name: config.partner_id.clone(),
                valid: true,
                errors: Vec::new(),
                warnings: config.lint(),
            },
            Err(ConfigStoreError::Invalid { source, .. }) => Self {
                name,
                valid: false,
                errors: source
                    .errors
                    .iter()
                    .map(|e| {
                        if e.path.is_empty() {
                            e.message.clone()
                        } else {
                            format!("{}: {}", e.path, e.message)
                        }
                    })
                    .collect(),
                warnings: Vec::new(),
            },
            Err(err) => Self {
                name,
                valid: false,
                errors: vec![err.to_string()],
                warnings: Vec::new(),
            },
        }
    }
}

/// One row of `list-partners`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerListing {
    pub partner_id: String,
    pub partner_name: String,
    pub template_id: String,
    pub file_format: String,
    pub target_tables: Vec<String>,
}

/// One row of `formats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatListing {
    pub reader: String,
    pub extensions: Vec<String>,
}

pub fn run_parse_partner(config: &AppConfig, partner_id: &str) -> Result<RunReport> {
    let span = info_span!("parse_partner", partner_id = %partner_id);
    let _guard = span.enter();
    let configs = config.config_store();
    let store = config.destination();
    let processor =
        PartnerProcessor::new(&configs, &store, &config.data_dir).with_options(config.options);
    processor.create_schema()?;
    let partner = processor.process_partner(partner_id);
    Ok(RunReport {
        dry_run: config.options.dry_run,
        partners: vec![partner],
    })
}

pub fn run_parse_all(config: &AppConfig) -> Result<RunReport> {
    let span = info_span!("parse_all");
    let _guard = span.enter();
    let configs = config.config_store();
    let store = config.destination();
    let processor =
        PartnerProcessor::new(&configs, &store, &config.data_dir).with_options(config.options);
    processor.create_schema()?;
    let report = processor.process_all()?;
    info!(
        partners = report.partners.len(),
        files = report.total_files(),
        records = report.total_records(),
        "run complete"
    );
    Ok(report)
}

/// Check one explicit file, one partner, or every partner in the configs dir.
pub fn run_validate_config(
    config: &AppConfig,
    partner_id: Option<&str>,
    file: Option<&Path>,
) -> Result<Vec<ConfigCheck>> {
    if let Some(path) = file {
        let name = path.display().to_string();
        return Ok(vec![ConfigCheck::from_result(
            name,
            JsonConfigStore::load_path(path),
        )]);
    }
    let store = config.config_store();
    let ids = match partner_id {
        Some(id) => vec![id.to_string()],
        None => store
            .list()
            .with_context(|| format!("listing {}", store.dir().display()))?,
    };
    Ok(ids
        .into_iter()
        .map(|id| {
            let result = store.load(&id);
            ConfigCheck::from_result(id, result)
        })
        .collect())
}

/// Valid partners in id order; invalid configurations are skipped.
pub fn run_list_partners(config: &AppConfig) -> Result<Vec<PartnerListing>> {
    let store = config.config_store();
    let ids = store
        .list()
        .with_context(|| format!("listing {}", store.dir().display()))?;
    let mut partners = Vec::with_capacity(ids.len());
    for id in ids {
        match store.load(&id) {
            Ok(partner) => partners.push(PartnerListing {
                target_tables: partner
                    .target_tables()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                file_format: partner.source_config.file_format.as_str().to_string(),
                partner_id: partner.partner_id,
                partner_name: partner.partner_name,
                template_id: partner.template_id,
            }),
            Err(err) => {
                warn!(partner_id = %id, error = %err, "skipping invalid configuration");
            }
        }
    }
    Ok(partners)
}

pub fn run_create_schema(config: &AppConfig) -> Result<PathBuf> {
    let configs = config.config_store();
    let store = config.destination();
    PartnerProcessor::new(&configs, &store, &config.data_dir)
        .with_options(config.options)
        .create_schema()?;
    Ok(store.dir().to_path_buf())
}

pub fn run_formats() -> Vec<FormatListing> {
    let dispatcher = FormatDispatcher::default();
    dispatcher
        .readers()
        .iter()
        .map(|reader| FormatListing {
            reader: reader.name().to_string(),
            extensions: reader
                .supported_extensions()
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect(),
        })
        .collect()
}
