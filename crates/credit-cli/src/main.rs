//! Credit dataset normalizer CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use credit_cli::logging::{LogConfig, LogFormat, init_logging};
use credit_output::Capabilities;
use tracing::debug;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_capabilities, run_datasets, run_load, run_preview, run_spec};
use crate::summary::print_load_summary;

/// Exit status when `--deny-warnings` is set and unmapped values were found.
const EXIT_WARNINGS: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    for status in Capabilities::detect().statuses() {
        debug!(capability = %status.capability, available = status.available, "capability");
    }

    let exit_code = match cli.command {
        Command::Load(args) => match run_load(&args) {
            Ok(result) => {
                print_load_summary(&result);
                if args.deny_warnings && result.report.has_warnings() {
                    EXIT_WARNINGS
                } else {
                    0
                }
            }
            Err(error) => report_error(&error),
        },
        Command::Preview(args) => match run_preview(&args) {
            Ok(table) => {
                println!("{table}");
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Datasets => run_datasets().map_or_else(|error| report_error(&error), |()| 0),
        Command::Spec(args) => run_spec(&args).map_or_else(|error| report_error(&error), |()| 0),
        Command::Capabilities => {
            run_capabilities().map_or_else(|error| report_error(&error), |()| 0)
        }
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
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
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
