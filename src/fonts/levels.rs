//! Mapping from font size to Markdown heading level.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::statistics::{key_size, size_key, FontStatistics};

/// Deepest heading level Markdown supports.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Heading level for each heading font size. Sizes not in the map are body text.
///
/// Built once per document and read-only afterwards. Larger sizes always get
/// a level number lower than or equal to smaller sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingLevelMap {
    /// Size key (tenths of a point) to level 1-6
    levels: BTreeMap<i32, u8>,
    /// Most common size in the document
    body_size: Option<f32>,
}

impl HeadingLevelMap {
    /// Rank the sizes of a histogram.
    ///
    /// Sizes strictly larger than `body + min_delta` are candidates; the
    /// `max_levels` largest become H1..Hn in descending size order.
    pub fn from_statistics(stats: &FontStatistics, max_levels: u8, min_delta: f32) -> Self {
        let Some(body) = stats.body_size() else {
            return Self::default();
        };
        let max_levels = max_levels.clamp(1, MAX_HEADING_LEVEL) as usize;
        let threshold = size_key(body + min_delta.max(0.0));

        let levels = stats
            .sizes()
            .map(|(size, _)| size_key(size))
            .filter(|key| *key > threshold)
            .rev()
            .take(max_levels)
            .zip(1u8..)
            .collect();

        Self {
            levels,
            body_size: Some(body),
        }
    }

    /// Heading level for a font size, `None` for body text.
    pub fn level_for(&self, size: f32) -> Option<u8> {
        self.levels.get(&size_key(size)).copied()
    }

    /// The body text size, if any text was seen.
    pub fn body_size(&self) -> Option<f32> {
        self.body_size
    }

    /// Heading sizes with their levels, largest size first.
    pub fn headings(&self) -> impl Iterator<Item = (f32, u8)> + '_ {
        self.levels.iter().rev().map(|(k, l)| (key_size(*k), *l))
    }

    /// Number of heading levels in use.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
