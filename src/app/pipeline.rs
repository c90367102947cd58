//! Shared "build pipeline" logic used by the `build` and `run` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! report folder -> snapshots -> index (regions + dates) -> aggregation -> JSON
//!
//! The two passes (index, then aggregate) stay separate: the complete region
//! set must be known before any region's zero-filled history can be emitted.

use crate::aggregate::{ReportIndex, aggregate_index};
use crate::domain::{ConsolidatedDataset, PipelineConfig};
use crate::error::AppError;
use crate::io::export::write_dataset_json;
use crate::io::ingest::{SnapshotSet, load_snapshots};

/// All computed outputs of a single build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub snapshots: SnapshotSet,
    pub dataset: ConsolidatedDataset,
}

/// Load the configured reports folder, aggregate, and write the dataset.
pub fn run_build(config: &PipelineConfig) -> Result<BuildOutput, AppError> {
    log::info!("Processing reports in {}", config.reports_dir.display());
    let snapshots = load_snapshots(&config.reports_dir, &config.country)?;

    run_build_with_snapshots(config, snapshots)
}

/// Aggregate already-loaded snapshots and write the dataset.
pub fn run_build_with_snapshots(config: &PipelineConfig, snapshots: SnapshotSet) -> Result<BuildOutput, AppError> {
    let dataset = build_dataset(&snapshots);
    if dataset.regions.is_empty() {
        log::warn!("No rows for '{}' in any report; the dataset has no regions", config.country);
    }

    write_dataset_json(&config.output, &dataset)?;

    Ok(BuildOutput { snapshots, dataset })
}

/// Pure part of the pipeline: index then aggregate.
pub fn build_dataset(snapshots: &SnapshotSet) -> ConsolidatedDataset {
    let index = ReportIndex::build(
        snapshots
            .values()
            .map(|snapshot| (snapshot.date, snapshot.observations.as_slice())),
    );
    log::info!(
        "Aggregating {} regions over {} dates",
        index.regions.len(),
        index.dates.len()
    );
    aggregate_index(&index)
}
