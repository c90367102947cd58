//! Command-line parsing for the daily case series builder.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! ingest/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_WORK_DIR: &str = "covid-temp";
pub const DEFAULT_COUNTRY: &str = "australia";
pub const DEFAULT_OUTPUT_FILE: &str = "data.json";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cases", version, about = "Per-region daily case series from daily snapshot reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the upstream archive and unpack the daily reports.
    Fetch(FetchArgs),
    /// Aggregate an existing folder of daily reports into the dataset JSON.
    Build(BuildArgs),
    /// `fetch` followed by `build` on the freshly fetched reports.
    Run(DatasetArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Work folder; only its `data/` folder is replaced.
    #[arg(long, default_value = DEFAULT_WORK_DIR)]
    pub work_dir: PathBuf,
}

/// Options shared by `build` and `run`.
#[derive(Debug, Args, Clone)]
pub struct DatasetArgs {
    /// Work folder holding `data/` and the default output.
    #[arg(long, default_value = DEFAULT_WORK_DIR)]
    pub work_dir: PathBuf,

    /// Country whose regions are aggregated (case-insensitive).
    #[arg(short = 'c', long, default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Dataset JSON path [default: <work-dir>/data.json].
    #[arg(short = 'o', long, value_name = "JSON")]
    pub output: Option<PathBuf>,

    /// Do not print the run summary.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Folder of `MM-DD-YYYY.csv` reports [default: <work-dir>/data].
    #[arg(long, value_name = "DIR")]
    pub reports: Option<PathBuf>,
}
