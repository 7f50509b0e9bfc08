//! Keyed statistic vectors
//!
//! A stat vector is a bag of named numeric categories ("Goals", "Shots",
//! "Penalty Minutes", ...) produced by a box score. Arithmetic combines
//! two vectors with union-of-keys semantics: a category present in only
//! one operand is never silently dropped.

use crate::{HockeyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A bag of named numeric statistics
///
/// Stat vectors deliberately do not implement `PartialEq`; comparing two
/// of them for equality is not a meaningful domain operation, and
/// forbidding it keeps accidental comparisons from compiling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatVector {
    values: BTreeMap<String, f64>,
    is_home: bool,
}

impl StatVector {
    /// The empty vector: the additive identity for `combine_sum`
    pub fn new() -> Self {
        StatVector::default()
    }

    pub fn from_entries<K, I>(entries: I, is_home: bool) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        StatVector {
            values: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            is_home,
        }
    }

    /// Same values, re-tagged with the given venue context
    pub fn with_home(mut self, is_home: bool) -> Self {
        self.is_home = is_home;
        self
    }

    /// Whether these stats were recorded in a home-game context
    pub fn is_home(&self) -> bool {
        self.is_home
    }

    /// Value for a category, defaulting to 0 when absent
    ///
    /// Scraped box scores legitimately omit optional categories, so a
    /// missing key is a diagnostic, not an error.
    pub fn get(&self, key: &str) -> f64 {
        match self.values.get(key) {
            Some(v) => *v,
            None => {
                log::debug!("stat category \"{}\" not recorded, defaulting to 0", key);
                0.0
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Elementwise sum; a key present in only one operand keeps its value
    pub fn combine_sum(&self, other: &StatVector) -> StatVector {
        let mut values = self.values.clone();
        for (key, value) in &other.values {
            *values.entry(key.clone()).or_insert(0.0) += value;
        }
        StatVector {
            values,
            is_home: self.is_home,
        }
    }

    /// Elementwise difference `self - other`; a key present only on the
    /// right-hand side contributes its negation
    pub fn combine_diff(&self, other: &StatVector) -> StatVector {
        let mut values = self.values.clone();
        for (key, value) in &other.values {
            *values.entry(key.clone()).or_insert(0.0) -= value;
        }
        StatVector {
            values,
            is_home: self.is_home,
        }
    }

    /// Every category scaled by a factor
    pub fn scale(&self, factor: f64) -> StatVector {
        StatVector {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v * factor))
                .collect(),
            is_home: self.is_home,
        }
    }

    /// Elementwise product on shared keys; a key present in only one
    /// operand keeps its value, mirroring the union policy of the other
    /// combinators
    pub fn combine_product(&self, other: &StatVector) -> StatVector {
        let mut values = self.values.clone();
        for (key, value) in &other.values {
            values
                .entry(key.clone())
                .and_modify(|v| *v *= value)
                .or_insert(*value);
        }
        StatVector {
            values,
            is_home: self.is_home,
        }
    }

    /// Elementwise quotient `self / other` on shared keys
    ///
    /// A zero denominator on a shared key is a hard failure, never a
    /// silent `inf`. Keys present in only one operand keep that operand's
    /// value.
    pub fn divide_by(&self, other: &StatVector) -> Result<StatVector> {
        let mut values = self.values.clone();
        for (key, value) in &other.values {
            match values.get_mut(key) {
                Some(v) => {
                    if *value == 0.0 {
                        return Err(HockeyError::DivideByZero { key: key.clone() });
                    }
                    *v /= value;
                }
                None => {
                    values.insert(key.clone(), *value);
                }
            }
        }
        Ok(StatVector {
            values,
            is_home: self.is_home,
        })
    }

    /// Every category divided by a scalar
    pub fn scale_div(&self, divisor: f64) -> Result<StatVector> {
        if divisor == 0.0 {
            return Err(HockeyError::ZeroDivisor);
        }
        Ok(self.scale(1.0 / divisor))
    }
}

impl fmt::Display for StatVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(entries: &[(&str, f64)]) -> StatVector {
        StatVector::from_entries(entries.iter().map(|(k, v)| (*k, *v)), false)
    }

    #[test]
    fn test_sum_union_of_keys() {
        let a = vector(&[("Goals", 3.0), ("Shots", 30.0)]);
        let b = vector(&[("Goals", 2.0), ("Hits", 12.0)]);

        let sum = a.combine_sum(&b);
        assert_eq!(sum.get("Goals"), 5.0);
        assert_eq!(sum.get("Shots"), 30.0);
        assert_eq!(sum.get("Hits"), 12.0);
        assert_eq!(sum.len(), 3);
    }

    #[test]
    fn test_diff_negates_missing_left_keys() {
        let a = vector(&[("Goals", 3.0)]);
        let b = vector(&[("Goals", 1.0), ("Hits", 4.0)]);

        let diff = a.combine_diff(&b);
        assert_eq!(diff.get("Goals"), 2.0);
        assert_eq!(diff.get("Hits"), -4.0);
    }

    #[test]
    fn test_empty_vector_is_additive_identity() {
        let games = [
            vector(&[("Goals", 2.0), ("Shots", 25.0)]),
            vector(&[("Goals", 4.0), ("Shots", 31.0)]),
        ];
        let sum = games
            .iter()
            .fold(StatVector::new(), |acc, g| acc.combine_sum(g));
        assert_eq!(sum.get("Goals"), 6.0);
        assert_eq!(sum.get("Shots"), 56.0);
    }

    #[test]
    fn test_scale_and_scalar_division() {
        let a = vector(&[("Goals", 3.0), ("Shots", 30.0)]);
        let scaled = a.scale(2.0);
        assert_eq!(scaled.get("Goals"), 6.0);

        let halved = a.scale_div(2.0).unwrap();
        assert_eq!(halved.get("Shots"), 15.0);

        assert!(matches!(a.scale_div(0.0), Err(HockeyError::ZeroDivisor)));
    }

    #[test]
    fn test_divide_by_zero_shared_key_fails() {
        let a = vector(&[("Goals", 3.0)]);
        let b = vector(&[("Goals", 0.0)]);

        match a.divide_by(&b) {
            Err(HockeyError::DivideByZero { key }) => assert_eq!(key, "Goals"),
            other => panic!("expected DivideByZero, got {:?}", other),
        }
    }

    #[test]
    fn test_divide_union_keeps_unshared_keys() {
        let a = vector(&[("Goals", 6.0), ("Shots", 30.0)]);
        let b = vector(&[("Goals", 2.0), ("Hits", 8.0)]);

        let quotient = a.divide_by(&b).unwrap();
        assert_eq!(quotient.get("Goals"), 3.0);
        assert_eq!(quotient.get("Shots"), 30.0);
        assert_eq!(quotient.get("Hits"), 8.0);
    }

    #[test]
    fn test_missing_key_defaults_to_zero() {
        let a = vector(&[("Goals", 3.0)]);
        assert_eq!(a.get("Faceoffs Won"), 0.0);
    }
}
