//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use mapline_core::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_WORKERS};

#[derive(Parser)]
#[command(
    name = "mapline",
    version,
    about = "Declarative partner file ingestion",
    long_about = "Parse partner spreadsheets and delimited exports into canonical tables.\n\n\
                  Each partner is described by a JSON configuration that maps source\n\
                  sheets and columns to target tables, types, transformations and filters."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, env = "MAPLINE_LOG_LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", env = "MAPLINE_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Print reports as JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,
}

/// Application settings; every flag has a `MAPLINE_*` environment fallback.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Directory holding `<partner_id>.json` configurations.
    #[arg(
        long = "configs-dir",
        value_name = "DIR",
        env = "MAPLINE_CONFIGS_DIR",
        default_value = "configs/partners",
        global = true
    )]
    pub configs_dir: PathBuf,

    /// Directory holding one sub-directory of data files per partner.
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "MAPLINE_DATA_DIR",
        default_value = "data_sources",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Directory receiving `<table>.csv` outputs.
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        env = "MAPLINE_OUTPUT_DIR",
        default_value = "output",
        global = true
    )]
    pub output_dir: PathBuf,

    /// Validate and report without storing anything.
    #[arg(long = "dry-run", env = "MAPLINE_DRY_RUN", global = true)]
    pub dry_run: bool,

    /// Rows per insert batch.
    #[arg(
        long = "batch-size",
        value_name = "ROWS",
        env = "MAPLINE_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        global = true
    )]
    pub batch_size: usize,

    /// Files processed in parallel per partner.
    #[arg(
        long = "max-workers",
        value_name = "N",
        env = "MAPLINE_MAX_WORKERS",
        default_value_t = DEFAULT_MAX_WORKERS,
        global = true
    )]
    pub max_workers: usize,

    /// Skip table validation.
    #[arg(long = "no-validation", env = "MAPLINE_NO_VALIDATION", global = true)]
    pub no_validation: bool,

    /// Store tables even when validation reports errors.
    ///
    /// Validation errors are then reported as warnings.
    #[arg(long = "tolerate-invalid", env = "MAPLINE_TOLERATE_INVALID", global = true)]
    pub tolerate_invalid: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse data files for one partner.
    ParsePartner(PartnerArgs),

    /// Parse data files for every configured partner.
    ParseAll,

    /// Validate partner configurations without reading data.
    ValidateConfig(ValidateConfigArgs),

    /// List configured partners.
    ListPartners,

    /// Prepare the output destination.
    CreateSchema,

    /// List supported file formats.
    Formats,
}

#[derive(Args)]
pub struct PartnerArgs {
    /// Partner identifier.
    #[arg(long = "partner-id", value_name = "ID")]
    pub partner_id: String,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Partner identifier (validates every partner when omitted).
    #[arg(long = "partner-id", value_name = "ID", conflicts_with = "file")]
    pub partner_id: Option<String>,

    /// Validate a configuration file at an explicit path.
    #[arg(long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
