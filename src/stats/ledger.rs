//! Date-ordered per-team stat ledger
//!
//! An append-only sequence of one team's per-game stat vectors, keyed by
//! date, with cumulative and trailing-window queries as of an arbitrary
//! cutoff. A sorted array backs the cutoff scan; per-team ledgers are
//! bounded by season length, so a prefix-sum structure is not worth its
//! complexity here.

use crate::stats::dates::{DateIndex, Direction};
use crate::stats::StatVector;
use crate::{HockeyError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered, date-keyed store of stat vectors
///
/// At most one entry may exist per date; duplicate insertion is a
/// contract violation, never a silent overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatLedger {
    entries: Vec<(NaiveDate, StatVector)>,
    index: DateIndex,
    check_order: bool,
}

impl StatLedger {
    pub fn new() -> Self {
        StatLedger::default()
    }

    /// A ledger that additionally rejects dates earlier than its running
    /// maximum, for ingestion paths that promise chronological order
    pub fn with_order_check() -> Self {
        StatLedger {
            check_order: true,
            ..StatLedger::default()
        }
    }

    fn from_entries(entries: Vec<(NaiveDate, StatVector)>) -> Self {
        let mut index = DateIndex::new();
        for (date, _) in &entries {
            index.insert(*date);
        }
        StatLedger {
            entries,
            index,
            check_order: false,
        }
    }

    /// Append a stat vector for a date. All-or-nothing: a rejected append
    /// leaves the ledger untouched.
    pub fn append(&mut self, date: NaiveDate, stats: StatVector) -> Result<()> {
        if self.index.contains(date) {
            return Err(HockeyError::DuplicateDate { date });
        }
        if self.check_order {
            if let Some(latest) = self.index.latest() {
                if date < latest {
                    return Err(HockeyError::OutOfOrder { date, latest });
                }
            }
        }
        let idx = self.entries.partition_point(|(d, _)| *d < date);
        self.entries.insert(idx, (date, stats));
        self.index.insert(date);
        Ok(())
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.index.contains(date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&StatVector> {
        self.entries
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The dates with entries, for closest-date lookups
    pub fn dates(&self) -> &DateIndex {
        &self.index
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &StatVector)> {
        self.entries.iter().map(|(d, s)| (*d, s))
    }

    /// Sum and count of all entries with `date <= cutoff` (all entries
    /// when no cutoff is given). An empty selection yields the empty
    /// vector and count 0; deriving an average from it is the caller's
    /// division to guard.
    pub fn total_as_of(&self, cutoff: Option<NaiveDate>) -> (StatVector, usize) {
        let mut sum = StatVector::new();
        let mut count = 0;
        for (date, stats) in &self.entries {
            if let Some(cutoff) = cutoff {
                if *date > cutoff {
                    break;
                }
            }
            sum = sum.combine_sum(stats);
            count += 1;
        }
        (sum, count)
    }

    pub fn total(&self) -> StatVector {
        self.total_as_of(None).0
    }

    /// Per-game average over entries with `date <= cutoff`
    pub fn average_as_of(&self, cutoff: Option<NaiveDate>) -> Result<StatVector> {
        let (sum, count) = self.total_as_of(cutoff);
        if count == 0 {
            return Err(HockeyError::EmptySelection);
        }
        sum.scale_div(count as f64)
    }

    pub fn average(&self) -> Result<StatVector> {
        self.average_as_of(None)
    }

    /// A fresh ledger holding the `n` chronologically latest entries
    pub fn last_n(&self, n: usize) -> StatLedger {
        self.last_n_as_of(None, n)
    }

    /// A fresh ledger holding the `n` latest entries at or before the
    /// cutoff
    pub fn last_n_as_of(&self, cutoff: Option<NaiveDate>, n: usize) -> StatLedger {
        let end = match cutoff {
            Some(cutoff) => self.entries.partition_point(|(d, _)| *d <= cutoff),
            None => self.entries.len(),
        };
        let start = end.saturating_sub(n);
        StatLedger::from_entries(self.entries[start..end].to_vec())
    }

    /// Latest entry at or before the cutoff
    pub fn closest_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.index.closest(date, Direction::AtOrBefore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    fn game(goals: f64, shots: f64) -> StatVector {
        StatVector::from_entries([("Goals", goals), ("Shots", shots)], false)
    }

    fn ledger(entries: &[(u32, f64, f64)]) -> StatLedger {
        let mut ledger = StatLedger::new();
        for (day, goals, shots) in entries {
            ledger.append(d(*day), game(*goals, *shots)).unwrap();
        }
        ledger
    }

    #[test]
    fn test_duplicate_date_rejected_without_mutation() {
        let mut ledger = ledger(&[(1, 3.0, 30.0)]);
        let err = ledger.append(d(1), game(2.0, 20.0)).unwrap_err();
        assert!(matches!(err, HockeyError::DuplicateDate { .. }));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(d(1)).unwrap().get("Goals"), 3.0);
    }

    #[test]
    fn test_order_check_rejects_regression() {
        let mut ledger = StatLedger::with_order_check();
        ledger.append(d(5), game(1.0, 10.0)).unwrap();
        let err = ledger.append(d(3), game(1.0, 10.0)).unwrap_err();
        assert!(matches!(err, HockeyError::OutOfOrder { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_total_as_of_cutoff() {
        let ledger = ledger(&[(1, 3.0, 30.0), (3, 0.0, 25.0), (5, 2.0, 28.0)]);

        let (sum, count) = ledger.total_as_of(Some(d(3)));
        assert_eq!(count, 2);
        assert_eq!(sum.get("Goals"), 3.0);
        assert_eq!(sum.get("Shots"), 55.0);

        let (all, n) = ledger.total_as_of(None);
        assert_eq!(n, 3);
        assert_eq!(all.get("Goals"), 5.0);
    }

    #[test]
    fn test_total_before_first_entry_is_empty() {
        let ledger = ledger(&[(3, 3.0, 30.0)]);
        let (sum, count) = ledger.total_as_of(Some(d(1)));
        assert_eq!(count, 0);
        assert!(sum.is_empty());
    }

    #[test]
    fn test_average_as_of() {
        let ledger = ledger(&[(1, 2.0, 20.0), (2, 4.0, 30.0)]);
        let avg = ledger.average_as_of(None).unwrap();
        assert_eq!(avg.get("Goals"), 3.0);
        assert_eq!(avg.get("Shots"), 25.0);
    }

    #[test]
    fn test_average_over_empty_selection_fails() {
        let ledger = ledger(&[(5, 2.0, 20.0)]);
        assert!(matches!(
            ledger.average_as_of(Some(d(1))),
            Err(HockeyError::EmptySelection)
        ));
        assert!(matches!(
            StatLedger::new().average(),
            Err(HockeyError::EmptySelection)
        ));
    }

    #[test]
    fn test_last_n_is_fresh_view() {
        let ledger = ledger(&[(1, 1.0, 10.0), (2, 2.0, 20.0), (3, 3.0, 30.0)]);
        let window = ledger.last_n(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window.total().get("Goals"), 5.0);
        // source untouched
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_last_n_as_of_respects_cutoff() {
        let ledger = ledger(&[(1, 1.0, 10.0), (3, 2.0, 20.0), (5, 3.0, 30.0)]);
        let window = ledger.last_n_as_of(Some(d(4)), 2);
        assert_eq!(window.len(), 2);
        assert_eq!(window.total().get("Goals"), 3.0);
    }

    #[test]
    fn test_last_n_larger_than_ledger() {
        let ledger = ledger(&[(1, 1.0, 10.0)]);
        assert_eq!(ledger.last_n(10).len(), 1);
    }
}
