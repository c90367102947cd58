//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the snapshot decoder
//! - carried through the aggregation walk
//! - exported to JSON for charting

use std::ops::Sub;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Case counts for one region at one point in time.
///
/// Used both for cumulative totals and for day-over-day deltas. Deltas are a
/// faithful componentwise difference, so they go negative when the source
/// corrects a total downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cases {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

impl Cases {
    pub const ZERO: Cases = Cases {
        confirmed: 0,
        deaths: 0,
        recovered: 0,
    };

    pub fn new(confirmed: i64, deaths: i64, recovered: i64) -> Self {
        Self {
            confirmed,
            deaths,
            recovered,
        }
    }

    /// `updated - self`, componentwise.
    pub fn difference(&self, updated: &Cases) -> Cases {
        Cases {
            confirmed: updated.confirmed - self.confirmed,
            deaths: updated.deaths - self.deaths,
            recovered: updated.recovered - self.recovered,
        }
    }
}

impl Sub for Cases {
    type Output = Cases;

    fn sub(self, earlier: Cases) -> Cases {
        earlier.difference(&self)
    }
}

/// One target-country row from one snapshot, after field resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRegionObservation {
    pub country_name: String,
    /// Case-insensitive identity of the region (see [`region_key`]).
    pub region_key: String,
    /// Region name as spelled in the snapshot.
    pub region_display_name: String,
    pub as_of_date: NaiveDate,
    /// Upstream `Last Update` value, carried for reference only.
    pub last_update: String,
    pub totals: Cases,
}

/// Normalize a raw region name into its lookup key.
pub fn region_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One entry in a region's densified series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(rename = "total")]
    pub total_cases: Cases,
    #[serde(rename = "new")]
    pub new_cases: Cases,
}

/// A region's display name and its per-date records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSeries {
    #[serde(skip)]
    pub key: String,
    pub name: String,
    #[serde(rename = "data")]
    pub series: Vec<DailyRecord>,
}

/// Aggregation output handed to the serializer.
///
/// Every region's series has exactly `dates.len()` records, aligned with `dates`.
/// Regions keep first-seen order; they are not sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidatedDataset {
    pub dates: Vec<NaiveDate>,
    #[serde(rename = "states", serialize_with = "serialize_regions")]
    pub regions: Vec<RegionSeries>,
}

impl ConsolidatedDataset {
    pub fn region(&self, key: &str) -> Option<&RegionSeries> {
        self.regions.iter().find(|r| r.key == key)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

// Emits regions as a JSON object keyed by region key, preserving order.
fn serialize_regions<S>(regions: &[RegionSeries], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(regions.len()))?;
    for region in regions {
        map.serialize_entry(&region.key, region)?;
    }
    map.end()
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scratch folder for the downloaded archive and default outputs.
    pub work_dir: PathBuf,
    /// Folder holding one `MM-DD-YYYY.csv` file per day.
    pub reports_dir: PathBuf,
    /// Country whose regions are aggregated (compared case-insensitively).
    pub country: String,
    pub output: PathBuf,
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_is_updated_minus_current() {
        let earlier = Cases::new(10, 2, 1);
        let later = Cases::new(15, 2, 4);
        assert_eq!(earlier.difference(&later), Cases::new(5, 0, 3));
        assert_eq!(later - earlier, Cases::new(5, 0, 3));
    }

    #[test]
    fn difference_keeps_downward_corrections() {
        let earlier = Cases::new(10, 3, 0);
        let corrected = Cases::new(8, 3, 0);
        assert_eq!(earlier.difference(&corrected), Cases::new(-2, 0, 0));
    }

    #[test]
    fn region_key_ignores_case_and_padding() {
        assert_eq!(region_key(" New South Wales "), "new south wales");
        assert_eq!(region_key("NEW SOUTH WALES"), region_key("New South Wales"));
    }
}
