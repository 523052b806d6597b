//! Page-level types.

use super::ContentBlock;
use serde::{Deserialize, Serialize};

/// A single page with its ordered content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Content blocks in reading order
    pub blocks: Vec<ContentBlock>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }

    /// Check if the page has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of heading blocks on the page.
    pub fn heading_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_heading()).count()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(1)
    }
}
