//! Sorted date index for closest-date lookups
//!
//! Backs the temporal queries of the ledger: "what is the latest date at
//! or before D on which this team played?"

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which side of the query date a lookup may land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AtOrBefore,
    AtOrAfter,
}

/// A sorted collection of dates
///
/// Duplicates are permitted here; date uniqueness is enforced one layer
/// up by the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateIndex {
    dates: Vec<NaiveDate>,
}

impl DateIndex {
    pub fn new() -> Self {
        DateIndex::default()
    }

    /// Insert a date, keeping the index sorted
    pub fn insert(&mut self, date: NaiveDate) {
        let idx = self.dates.partition_point(|d| *d <= date);
        self.dates.insert(idx, date);
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// The extremal date satisfying the relation, or None if no date in
    /// the index lies on that side. An exact match satisfies either
    /// direction.
    pub fn closest(&self, date: NaiveDate, direction: Direction) -> Option<NaiveDate> {
        match direction {
            Direction::AtOrBefore => {
                let idx = self.dates.partition_point(|d| *d <= date);
                idx.checked_sub(1).map(|i| self.dates[i])
            }
            Direction::AtOrAfter => {
                let idx = self.dates.partition_point(|d| *d < date);
                self.dates.get(idx).copied()
            }
        }
    }

    /// Up to `n` dates on the given side of `date`, ordered nearest-first
    pub fn n_closest(&self, date: NaiveDate, n: usize, direction: Direction) -> Vec<NaiveDate> {
        match direction {
            Direction::AtOrBefore => {
                let idx = self.dates.partition_point(|d| *d <= date);
                self.dates[..idx].iter().rev().take(n).copied().collect()
            }
            Direction::AtOrAfter => {
                let idx = self.dates.partition_point(|d| *d < date);
                self.dates[idx..].iter().take(n).copied().collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    fn index(days: &[u32]) -> DateIndex {
        let mut idx = DateIndex::new();
        for day in days {
            idx.insert(d(*day));
        }
        idx
    }

    #[test]
    fn test_insert_keeps_sorted_order() {
        let idx = index(&[5, 1, 3]);
        let dates: Vec<_> = idx.iter().collect();
        assert_eq!(dates, vec![d(1), d(3), d(5)]);
    }

    #[test]
    fn test_closest_between_entries() {
        let idx = index(&[1, 3, 5]);
        assert_eq!(idx.closest(d(4), Direction::AtOrBefore), Some(d(3)));
        assert_eq!(idx.closest(d(4), Direction::AtOrAfter), Some(d(5)));
    }

    #[test]
    fn test_closest_inclusive_boundary() {
        let idx = index(&[1, 3, 5]);
        assert_eq!(idx.closest(d(1), Direction::AtOrBefore), Some(d(1)));
        assert_eq!(idx.closest(d(5), Direction::AtOrAfter), Some(d(5)));
    }

    #[test]
    fn test_closest_past_the_ends() {
        let idx = index(&[3, 5]);
        assert_eq!(idx.closest(d(2), Direction::AtOrBefore), None);
        assert_eq!(idx.closest(d(6), Direction::AtOrAfter), None);
    }

    #[test]
    fn test_n_closest_nearest_first() {
        let idx = index(&[1, 3, 5, 7]);
        assert_eq!(
            idx.n_closest(d(6), 2, Direction::AtOrBefore),
            vec![d(5), d(3)]
        );
        assert_eq!(
            idx.n_closest(d(2), 3, Direction::AtOrAfter),
            vec![d(3), d(5), d(7)]
        );
    }

    #[test]
    fn test_n_closest_fewer_than_requested() {
        let idx = index(&[1, 3]);
        assert_eq!(
            idx.n_closest(d(9), 5, Direction::AtOrBefore),
            vec![d(3), d(1)]
        );
    }

    #[test]
    fn test_duplicates_permitted() {
        let idx = index(&[3, 3]);
        assert_eq!(idx.len(), 2);
        assert!(idx.contains(d(3)));
    }
}
