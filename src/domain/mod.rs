//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the case-count value type (`Cases`)
//! - decoded snapshot rows (`RawRegionObservation`)
//! - aggregation outputs (`DailyRecord`, `RegionSeries`, `ConsolidatedDataset`)
//! - run configuration (`PipelineConfig`)

pub mod types;

pub use types::*;
