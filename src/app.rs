//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - fetches and unpacks the daily reports
//! - runs the ingest + aggregation pipeline
//! - writes the dataset and prints a summary

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, DEFAULT_OUTPUT_FILE, DatasetArgs, FetchArgs};
use crate::data::{ArchiveSource, reports_dir};
use crate::domain::PipelineConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cases` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fetch(args) => handle_fetch(&args).map(|_| ()),
        Command::Build(args) => {
            let config = pipeline_config_from_args(&args.dataset, args.reports.as_deref());
            handle_build(&config)
        }
        Command::Run(args) => {
            let reports = handle_fetch(&FetchArgs {
                work_dir: args.work_dir.clone(),
            })?;
            handle_build(&pipeline_config_from_args(&args, Some(reports.as_path())))
        }
    }
}

fn handle_fetch(args: &FetchArgs) -> Result<PathBuf, AppError> {
    let source = ArchiveSource::from_env()?;
    source.fetch_reports(&args.work_dir)
}

fn handle_build(config: &PipelineConfig) -> Result<(), AppError> {
    let run = pipeline::run_build(config)?;

    if !config.quiet {
        println!(
            "{}",
            crate::report::format_run_summary(&run.dataset, &run.snapshots, config)
        );
    }

    Ok(())
}

/// `reports` overrides the default `<work-dir>/data` reports folder.
pub fn pipeline_config_from_args(args: &DatasetArgs, reports: Option<&Path>) -> PipelineConfig {
    PipelineConfig {
        work_dir: args.work_dir.clone(),
        reports_dir: reports
            .map(Path::to_path_buf)
            .unwrap_or_else(|| reports_dir(&args.work_dir)),
        country: args.country.clone(),
        output: args
            .output
            .clone()
            .unwrap_or_else(|| args.work_dir.join(DEFAULT_OUTPUT_FILE)),
        quiet: args.quiet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defaults_live_under_work_dir() {
        let cli = crate::cli::Cli::parse_from(["cases", "build", "--work-dir", "tmp-work"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let config = pipeline_config_from_args(&args.dataset, args.reports.as_deref());

        assert_eq!(config.reports_dir, PathBuf::from("tmp-work").join("data"));
        assert_eq!(config.output, PathBuf::from("tmp-work").join("data.json"));
        assert_eq!(config.country, "australia");
        assert!(!config.quiet);
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let cli = crate::cli::Cli::parse_from([
            "cases", "build", "--reports", "r", "-o", "out.json", "-c", "Canada", "-q",
        ]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let config = pipeline_config_from_args(&args.dataset, args.reports.as_deref());

        assert_eq!(config.reports_dir, PathBuf::from("r"));
        assert_eq!(config.output, PathBuf::from("out.json"));
        assert_eq!(config.country, "Canada");
        assert!(config.quiet);
    }

    #[test]
    fn run_builds_from_the_fetched_reports() {
        assert!(crate::cli::Cli::try_parse_from(["cases", "run", "--reports", "r"]).is_err());

        let cli = crate::cli::Cli::parse_from(["cases", "run", "--work-dir", "w", "-c", "Canada"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let fetched = PathBuf::from("w").join("data");
        let config = pipeline_config_from_args(&args, Some(fetched.as_path()));

        assert_eq!(config.reports_dir, fetched);
        assert_eq!(config.output, PathBuf::from("w").join("data.json"));
        assert_eq!(config.country, "Canada");
    }
}
