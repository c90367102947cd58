//! Second pass: the chronological walk.
//!
//! For each date (ascending) and each registered region (first-seen order),
//! look up that day's reported total, derive the delta through a single
//! `RunningTotals` shared across the whole walk, and append a record. Every
//! region ends up with exactly one record per indexed date.

use chrono::NaiveDate;

use crate::aggregate::index::{ObservationTable, RegionRegistry, ReportIndex};
use crate::aggregate::totals::RunningTotals;
use crate::domain::{Cases, ConsolidatedDataset, DailyRecord, RawRegionObservation, RegionSeries};

/// Build the densified dataset from an index.
pub fn aggregate_index(index: &ReportIndex) -> ConsolidatedDataset {
    aggregate(&index.dates, &index.regions, &index.observations)
}

/// Index and aggregate per-date observation groups in one call.
pub fn aggregate_observations<'a>(
    days: impl IntoIterator<Item = (NaiveDate, &'a [RawRegionObservation])>,
) -> ConsolidatedDataset {
    let index = ReportIndex::build(days);
    aggregate_index(&index)
}

/// Walk `dates` (must be ascending) and emit one record per region per date.
///
/// A region with no observation on a date keeps its last known cumulative
/// total (zero new cases); before its first observation that total is zero.
pub fn aggregate(dates: &[NaiveDate], regions: &RegionRegistry, observations: &ObservationTable) -> ConsolidatedDataset {
    let mut totals = RunningTotals::new();
    let mut series: Vec<RegionSeries> = regions
        .iter()
        .map(|entry| RegionSeries {
            key: entry.key.clone(),
            name: entry.display_name.clone(),
            series: Vec::with_capacity(dates.len()),
        })
        .collect();

    for &date in dates {
        let reported = observations.get(&date);

        for region in series.iter_mut() {
            let total_cases = reported
                .and_then(|day| day.get(&region.key))
                .copied()
                .or_else(|| totals.last_total(&region.key))
                .unwrap_or(Cases::ZERO);

            let new_cases = totals.record_observation(&region.key, total_cases);
            region.series.push(DailyRecord {
                date,
                total_cases,
                new_cases,
            });
        }
    }

    ConsolidatedDataset {
        dates: dates.to_vec(),
        regions: series,
    }
}
