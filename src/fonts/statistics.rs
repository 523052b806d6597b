//! Font size histogram.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Round a font size to a histogram key in tenths of a point.
pub fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Font size for a histogram key.
pub fn key_size(key: i32) -> f32 {
    key as f32 / 10.0
}

/// Frequency of every observed font size, rounded to 0.1pt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStatistics {
    histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        *self.histogram.entry(size_key(size)).or_insert(0) += 1;
    }

    /// Fold another histogram into this one.
    pub fn merge(&mut self, other: &FontStatistics) {
        for (key, count) in &other.histogram {
            *self.histogram.entry(*key).or_insert(0) += count;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// Total number of observations.
    pub fn sample_count(&self) -> usize {
        self.histogram.values().sum()
    }

    /// Number of observations of `size`.
    pub fn count(&self, size: f32) -> usize {
        self.histogram.get(&size_key(size)).copied().unwrap_or(0)
    }

    /// Distinct sizes with their counts, smallest first.
    pub fn sizes(&self) -> impl DoubleEndedIterator<Item = (f32, usize)> + '_ {
        self.histogram.iter().map(|(k, c)| (key_size(*k), *c))
    }

    /// The most common size. Ties go to the smaller size.
    pub fn body_size(&self) -> Option<f32> {
        let mut best: Option<(i32, usize)> = None;
        for (key, count) in &self.histogram {
            match best {
                Some((_, best_count)) if *count <= best_count => {}
                _ => best = Some((*key, *count)),
            }
        }
        best.map(|(key, _)| key_size(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_to_tenths() {
        let mut stats = FontStatistics::new();
        stats.add_size(11.96);
        stats.add_size(12.04);
        stats.add_size(12.0);
        assert_eq!(stats.count(12.0), 3);
        assert_eq!(stats.sizes().count(), 1);
    }

    #[test]
    fn test_body_size_most_common() {
        let mut stats = FontStatistics::new();
        for _ in 0..100 {
            stats.add_size(12.0);
        }
        for _ in 0..5 {
            stats.add_size(18.0);
        }
        assert_eq!(stats.body_size(), Some(12.0));
        assert_eq!(stats.sample_count(), 105);
    }

    #[test]
    fn test_body_size_tie_prefers_smaller() {
        let mut stats = FontStatistics::new();
        stats.add_size(14.0);
        stats.add_size(10.0);
        stats.add_size(14.0);
        stats.add_size(10.0);
        assert_eq!(stats.body_size(), Some(10.0));
    }

    #[test]
    fn test_ignores_invalid_sizes() {
        let mut stats = FontStatistics::new();
        stats.add_size(0.0);
        stats.add_size(-3.0);
        stats.add_size(f32::NAN);
        assert!(stats.is_empty());
        assert_eq!(stats.body_size(), None);
    }

    #[test]
    fn test_merge() {
        let mut a = FontStatistics::new();
        a.add_size(12.0);
        let mut b = FontStatistics::new();
        b.add_size(12.0);
        b.add_size(20.0);
        a.merge(&b);
        assert_eq!(a.count(12.0), 2);
        assert_eq!(a.count(20.0), 1);
    }
}
