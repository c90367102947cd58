//! Export the consolidated dataset to JSON.
//!
//! The JSON is meant to be loaded directly by the charting front-end: dates are
//! plain `YYYY-MM-DD` strings and regions are keyed by their lowercase key in
//! first-seen order.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ConsolidatedDataset;
use crate::error::AppError;

/// Write `dataset` as pretty-printed JSON, creating parent folders as needed.
pub fn write_dataset_json(path: &Path, dataset: &ConsolidatedDataset) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create output folder '{}': {e}", parent.display())))?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    write_dataset(&mut writer, dataset)?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write dataset JSON: {e}")))?;

    log::info!("Wrote {} regions x {} dates to {}", dataset.regions.len(), dataset.dates.len(), path.display());
    Ok(())
}

/// Serialize `dataset` to any writer.
pub fn write_dataset<W: Write>(writer: W, dataset: &ConsolidatedDataset) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, dataset)
        .map_err(|e| AppError::new(2, format!("Failed to write dataset JSON: {e}")))
}
