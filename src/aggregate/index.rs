//! First pass: the region and date universe.
//!
//! Densification needs the complete region set and date range before any
//! series is emitted: a region first reported on day 10 still gets records for
//! days 1..9. Building the index is therefore a separate pass that runs before
//! the aggregation walk.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{Cases, RawRegionObservation};

/// Reported cumulative totals, by date then region key.
pub type ObservationTable = HashMap<NaiveDate, HashMap<String, Cases>>;

/// Region keys in first-seen order, each with its display name.
///
/// The display name is fixed by the first observation of a key; later
/// spellings never replace it.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    entries: Vec<RegionEntry>,
    positions: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEntry {
    pub key: String,
    pub display_name: String,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` if unseen. Returns `true` when the key was new.
    pub fn register(&mut self, key: &str, display_name: &str) -> bool {
        if self.positions.contains_key(key) {
            return false;
        }
        self.positions.insert(key.to_string(), self.entries.len());
        self.entries.push(RegionEntry {
            key: key.to_string(),
            display_name: display_name.to_string(),
        });
        true
    }

    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&idx| self.entries[idx].display_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the aggregation walk needs, discovered up front.
#[derive(Debug, Clone, Default)]
pub struct ReportIndex {
    /// Distinct snapshot dates, ascending.
    pub dates: Vec<NaiveDate>,
    pub regions: RegionRegistry,
    pub observations: ObservationTable,
}

impl ReportIndex {
    /// Index per-date observation groups, given in any order.
    ///
    /// Every date is part of the range, including days on which the target
    /// country reported nothing. If two groups share a date, the first
    /// reported value for a region on that date is kept.
    pub fn build<'a>(days: impl IntoIterator<Item = (NaiveDate, &'a [RawRegionObservation])>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<&'a [RawRegionObservation]>> = BTreeMap::new();
        for (date, observations) in days {
            by_date.entry(date).or_default().push(observations);
        }

        let mut index = ReportIndex {
            dates: Vec::with_capacity(by_date.len()),
            ..Default::default()
        };

        for (date, groups) in by_date {
            index.dates.push(date);
            let day = index.observations.entry(date).or_default();

            for obs in groups.into_iter().flatten() {
                index.regions.register(&obs.region_key, &obs.region_display_name);
                day.entry(obs.region_key.clone()).or_insert(obs.totals);
            }
        }

        log::debug!(
            "Indexed {} dates and {} regions",
            index.dates.len(),
            index.regions.len()
        );
        index
    }

    /// Reported total for `region` on `date`, if that day's snapshot had it.
    pub fn reported(&self, date: NaiveDate, region: &str) -> Option<Cases> {
        self.observations.get(&date)?.get(region).copied()
    }
}
