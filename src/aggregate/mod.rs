//! Chronological aggregation of daily snapshots.
//!
//! Responsibilities:
//!
//! - discover the full region/date universe before any deltas (`index`)
//! - carry per-region cumulative totals across dates (`totals`)
//! - walk dates in order and emit one record per region per date (`aggregator`)

pub mod aggregator;
pub mod index;
pub mod totals;

pub use aggregator::*;
pub use index::*;
pub use totals::*;
