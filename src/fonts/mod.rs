//! Font-size analysis for heading detection.
//!
//! Every text span of the document contributes its size to a histogram.
//! The most common size is body text; the largest sizes above it become
//! heading levels.

mod levels;
mod statistics;

pub use levels::{HeadingLevelMap, MAX_HEADING_LEVEL};
pub use statistics::{size_key, FontStatistics};

use crate::parser::TextSpan;

/// Collects span sizes page by page and produces the heading map.
#[derive(Debug, Clone)]
pub struct FontAnalyzer {
    stats: FontStatistics,
    max_levels: u8,
    min_delta: f32,
}

impl FontAnalyzer {
    pub fn new(max_levels: u8, min_delta: f32) -> Self {
        Self {
            stats: FontStatistics::new(),
            max_levels: max_levels.clamp(1, MAX_HEADING_LEVEL),
            min_delta,
        }
    }

    /// Record one sample per non-blank span.
    pub fn observe(&mut self, spans: &[TextSpan]) {
        for span in spans.iter().filter(|s| !s.text.trim().is_empty()) {
            self.stats.add_size(span.font_size);
        }
    }

    pub fn statistics(&self) -> &FontStatistics {
        &self.stats
    }

    /// Build the heading map from everything observed so far.
    pub fn finish(&self) -> HeadingLevelMap {
        let map = HeadingLevelMap::from_statistics(&self.stats, self.max_levels, self.min_delta);
        log::info!(
            "Font analysis: {} samples, body size {:?}, {} heading levels",
            self.stats.sample_count(),
            map.body_size(),
            map.len()
        );
        for (size, level) in map.headings() {
            log::debug!("  {:.1}pt -> H{}", size, level);
        }
        map
    }
}

impl Default for FontAnalyzer {
    fn default() -> Self {
        Self::new(MAX_HEADING_LEVEL, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), 0.0, 0.0, size, "Helvetica".to_string())
    }

    #[test]
    fn test_analyzer_counts_non_blank_spans() {
        let mut analyzer = FontAnalyzer::default();
        analyzer.observe(&[span("Title", 24.0), span("   ", 30.0), span("body", 12.0)]);
        analyzer.observe(&[span("more body", 12.0)]);

        assert_eq!(analyzer.statistics().sample_count(), 3);
        let map = analyzer.finish();
        assert_eq!(map.body_size(), Some(12.0));
        assert_eq!(map.level_for(24.0), Some(1));
        assert_eq!(map.level_for(30.0), None);
    }

    #[test]
    fn test_analyzer_clamps_levels() {
        let mut analyzer = FontAnalyzer::new(0, 0.0);
        analyzer.observe(&[span("a", 10.0), span("b", 10.0), span("c", 20.0), span("d", 16.0)]);
        let map = analyzer.finish();
        assert_eq!(map.len(), 1);
        assert_eq!(map.level_for(20.0), Some(1));
    }
}
