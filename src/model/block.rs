//! Content blocks: the page-ordered units emitted as Markdown.

use serde::{Deserialize, Serialize};

use super::{PageImage, Table};

/// Axis-aligned box in PDF user space (points, y grows upwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl BoundingBox {
    /// Create a box, normalizing swapped corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            left: x0.min(x1),
            bottom: y0.min(y1),
            right: x0.max(x1),
            top: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }

    /// Whether `other` lies entirely inside this box, with `tolerance`
    /// points of slack on every side.
    pub fn contains(&self, other: &BoundingBox, tolerance: f32) -> bool {
        other.left >= self.left - tolerance
            && other.bottom >= self.bottom - tolerance
            && other.right <= self.right + tolerance
            && other.top <= self.top + tolerance
    }

    /// Whether the two boxes overlap. Boxes with NaN edges never do.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        other.left <= self.right
            && other.right >= self.left
            && other.bottom <= self.top
            && other.top >= self.bottom
    }
}

/// One unit of extracted page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A heading line (level 1-6).
    Heading {
        level: u8,
        text: String,
        bbox: BoundingBox,
    },
    /// Body text. May contain `**bold**` runs.
    Paragraph { text: String, bbox: BoundingBox },
    /// A detected table.
    Table { table: Table, bbox: BoundingBox },
    /// An image placed on the page.
    Image { image: PageImage, bbox: BoundingBox },
}

impl ContentBlock {
    pub fn heading(level: u8, text: impl Into<String>, bbox: BoundingBox) -> Self {
        ContentBlock::Heading {
            level,
            text: text.into(),
            bbox,
        }
    }

    pub fn paragraph(text: impl Into<String>, bbox: BoundingBox) -> Self {
        ContentBlock::Paragraph {
            text: text.into(),
            bbox,
        }
    }

    /// Bounding box of the block on its page.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            ContentBlock::Heading { bbox, .. }
            | ContentBlock::Paragraph { bbox, .. }
            | ContentBlock::Table { bbox, .. }
            | ContentBlock::Image { bbox, .. } => bbox,
        }
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::Table { .. } => "table",
            ContentBlock::Image { .. } => "image",
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, ContentBlock::Heading { .. })
    }
}

/// Sort blocks top-to-bottom (then left-to-right) in place.
///
/// The sort is stable, so blocks sharing a top edge and left edge keep the
/// order in which they were produced.
pub fn sort_reading_order(blocks: &mut [ContentBlock]) {
    blocks.sort_by(|a, b| {
        let (a, b) = (a.bbox(), b.bbox());
        b.top
            .partial_cmp(&a.top)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.left
                    .partial_cmp(&b.left)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
}
