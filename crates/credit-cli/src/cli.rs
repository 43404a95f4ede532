//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "credit-normalize",
    version,
    about = "Normalize credit-risk datasets for fairness analysis",
    long_about = "Load a credit-risk CSV (Taiwan, German, UK, BENE, HomeCredit, GMSC, PKDD, NFL),\n\
                  binarize its protected attribute, recode its label and write a canonical\n\
                  CSV plus a JSON descriptor for the fairness toolkit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
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
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw cell values (e.g. unmapped labels) in logs and summaries.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize one dataset and write its canonical outputs.
    Load(LoadArgs),

    /// Normalize one dataset and print its first rows.
    Preview(PreviewArgs),

    /// List the built-in datasets.
    Datasets,

    /// Print a built-in field spec as TOML.
    Spec(SpecArgs),

    /// Report which optional capabilities this build has.
    Capabilities,
}

/// Where the data comes from and how to normalize it.
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Raw CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Built-in dataset key (taiwan, german, uk, bene, homecredit, gmsc, pkdd, nfl).
    #[arg(
        long = "dataset",
        short = 'd',
        value_name = "KEY",
        required_unless_present = "spec",
        conflicts_with = "spec"
    )]
    pub dataset: Option<String>,

    /// Custom field spec (TOML) instead of a built-in dataset.
    #[arg(long = "spec", value_name = "PATH")]
    pub spec: Option<PathBuf>,

    /// Read the label from this raw column instead of the field spec's.
    #[arg(long = "label-column", value_name = "COLUMN")]
    pub label_column: Option<String>,

    /// Seed the row shuffle so runs are reproducible.
    #[arg(long = "seed", value_name = "N", conflicts_with = "no_shuffle")]
    pub seed: Option<u64>,

    /// Never shuffle rows, even when the dataset asks for it.
    #[arg(long = "no-shuffle")]
    pub no_shuffle: bool,

    /// Keep rows with missing feature values.
    #[arg(long = "keep-incomplete")]
    pub keep_incomplete: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory (default: <INPUT directory>/normalized).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Normalize and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Exit with status 2 when unmapped values were found.
    #[arg(long = "deny-warnings")]
    pub deny_warnings: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of rows to show.
    #[arg(long = "rows", short = 'n', default_value_t = 10)]
    pub rows: usize,
}

#[derive(Args)]
pub struct SpecArgs {
    /// Dataset key.
    #[arg(value_name = "KEY")]
    pub dataset: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
