//! Last-seen cumulative totals per region.

use std::collections::HashMap;

use crate::domain::Cases;

/// Most recent cumulative `Cases` per region key.
///
/// Calls for a given region must arrive in non-decreasing date order; the
/// returned delta is only meaningful against the immediately preceding call.
/// Ordering is the caller's job (the aggregator owns the date walk).
#[derive(Debug, Clone, Default)]
pub struct RunningTotals {
    current: HashMap<String, Cases>,
}

impl RunningTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `total` for `region` and return the change since the last call.
    ///
    /// The first observation of a region is entirely new.
    pub fn record_observation(&mut self, region: &str, total: Cases) -> Cases {
        match self.current.insert(region.to_string(), total) {
            Some(previous) => previous.difference(&total),
            None => total,
        }
    }

    /// Last cumulative total seen for `region`, if any.
    pub fn last_total(&self, region: &str) -> Option<Cases> {
        self.current.get(region).copied()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_all_new() {
        let mut totals = RunningTotals::new();
        let total = Cases::new(4, 1, 0);
        assert_eq!(totals.record_observation("victoria", total), total);
        assert_eq!(totals.last_total("victoria"), Some(total));
    }

    #[test]
    fn later_observations_return_difference() {
        let mut totals = RunningTotals::new();
        totals.record_observation("victoria", Cases::new(4, 1, 0));
        let delta = totals.record_observation("victoria", Cases::new(9, 1, 3));
        assert_eq!(delta, Cases::new(5, 0, 3));
        assert_eq!(totals.last_total("victoria"), Some(Cases::new(9, 1, 3)));
    }

    #[test]
    fn downward_correction_is_negative() {
        let mut totals = RunningTotals::new();
        totals.record_observation("queensland", Cases::new(20, 0, 5));
        let delta = totals.record_observation("queensland", Cases::new(18, 0, 5));
        assert_eq!(delta, Cases::new(-2, 0, 0));
    }

    #[test]
    fn regions_are_tracked_independently() {
        let mut totals = RunningTotals::new();
        totals.record_observation("victoria", Cases::new(4, 0, 0));
        assert_eq!(totals.record_observation("tasmania", Cases::new(1, 0, 0)), Cases::new(1, 0, 0));
        assert_eq!(totals.record_observation("victoria", Cases::new(6, 0, 0)), Cases::new(2, 0, 0));
        assert_eq!(totals.len(), 2);
    }
}
