//! mapline CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use mapline_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use mapline_cli::commands::{
    run_create_schema, run_formats, run_list_partners, run_parse_all, run_parse_partner,
    run_validate_config,
};
use mapline_cli::logging::{LogConfig, LogFormat, init_logging};
use mapline_cli::settings::AppConfig;
use mapline_cli::summary::{
    print_config_checks, print_formats, print_json, print_partner_list, print_run_report,
};

fn main() -> ExitCode {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch the subcommand; `Ok(false)` means it ran but reported errors.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = AppConfig::from_args(&cli.settings)?;
    match &cli.command {
        Command::ParsePartner(args) => {
            let report = run_parse_partner(&config, &args.partner_id)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_run_report(&report);
            }
            Ok(!report.has_errors())
        }
        Command::ParseAll => {
            let report = run_parse_all(&config)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_run_report(&report);
            }
            Ok(!report.has_errors())
        }
        Command::ValidateConfig(args) => {
            let checks =
                run_validate_config(&config, args.partner_id.as_deref(), args.file.as_deref())?;
            if cli.json {
                print_json(&checks)?;
            } else {
                print_config_checks(&checks);
            }
            Ok(checks.iter().all(|check| check.valid))
        }
        Command::ListPartners => {
            let partners = run_list_partners(&config)?;
            if cli.json {
                print_json(&partners)?;
            } else {
                print_partner_list(&partners);
            }
            Ok(true)
        }
        Command::CreateSchema => {
            let dir = run_create_schema(&config)?;
            if config.options.dry_run {
                println!("Dry run: output directory not created");
            } else {
                println!("Output directory ready: {}", dir.display());
            }
            Ok(true)
        }
        Command::Formats => {
            let formats = run_formats();
            if cli.json {
                print_json(&formats)?;
            } else {
                print_formats(&formats);
            }
            Ok(true)
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
