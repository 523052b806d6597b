//! Conversion result with statistics.

use serde::{Deserialize, Serialize};

use crate::fonts::HeadingLevelMap;
use crate::model::ContentBlock;

/// Result of converting a document: the Markdown plus what went into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResult {
    /// The rendered Markdown
    pub markdown: String,

    /// Heading map the document was rendered with
    pub headings: HeadingLevelMap,

    /// Extraction statistics
    pub stats: ConversionStats,
}

impl ConvertResult {
    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.markdown.len()
    }
}

/// Counts of what was emitted during conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages rendered
    pub pages: u32,

    /// Heading blocks emitted
    pub headings: u32,

    /// Paragraph blocks emitted
    pub paragraphs: u32,

    /// Tables emitted
    pub tables: u32,

    /// Images saved and referenced
    pub images: u32,

    /// Images that could not be extracted or saved
    pub skipped_images: u32,

    /// Pages skipped because their content could not be read
    pub skipped_pages: u32,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted block.
    pub fn record(&mut self, block: &ContentBlock) {
        match block {
            ContentBlock::Heading { .. } => self.headings += 1,
            ContentBlock::Paragraph { .. } => self.paragraphs += 1,
            ContentBlock::Table { .. } => self.tables += 1,
            ContentBlock::Image { .. } => self.images += 1,
        }
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.pages += other.pages;
        self.headings += other.headings;
        self.paragraphs += other.paragraphs;
        self.tables += other.tables;
        self.images += other.images;
        self.skipped_images += other.skipped_images;
        self.skipped_pages += other.skipped_pages;
    }
}
