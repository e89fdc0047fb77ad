//! CLI argument definitions for the disparity analyzer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "edgap",
    version,
    about = "ED wait-time disparity analyzer",
    long_about = "Estimate racial and gender disparities in emergency department\n\
                  wait times from a visit-level CSV file.\n\n\
                  Cleans and bins the input, fits a confounder-adjusted Bayesian\n\
                  tree-ensemble estimator per subgroup, and writes one result\n\
                  table plus the cleaned dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full analysis over one input CSV.
    Analyze(AnalyzeArgs),

    /// List the columns the input file must provide.
    Columns,
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to the visit-level CSV file.
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Output directory for generated files (default: <INPUT_CSV dir>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Random seed shared by every subgroup fit.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Subsample fits larger than this many rows.
    #[arg(long = "max-fit-rows")]
    pub max_fit_rows: Option<usize>,

    /// Trees in the ensemble.
    #[arg(long = "trees")]
    pub trees: Option<usize>,

    /// Kept posterior draws, split across chains.
    #[arg(long = "draws")]
    pub draws: Option<usize>,

    /// Discarded warm-up iterations per chain.
    #[arg(long = "burn-in")]
    pub burn_in: Option<usize>,

    /// Independent sampling chains.
    #[arg(long = "chains")]
    pub chains: Option<usize>,

    /// Clean, estimate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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
