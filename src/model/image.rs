//! Image types for pictures placed on a page.

use serde::{Deserialize, Serialize};

/// Color space of raw image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageColor {
    /// Grayscale (1 component)
    Gray,
    /// RGB color (3 components)
    #[default]
    Rgb,
    /// CMYK color (4 components)
    Cmyk,
}

impl ImageColor {
    /// Number of components per pixel.
    pub fn components(&self) -> usize {
        match self {
            ImageColor::Gray => 1,
            ImageColor::Rgb => 3,
            ImageColor::Cmyk => 4,
        }
    }
}

/// Encoded or raw pixel data of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ImagePayload {
    /// DCTDecode stream, written out unchanged.
    Jpeg {
        #[serde(skip)]
        data: Vec<u8>,
    },
    /// Decoded samples, encoded as PNG on save.
    Raw {
        color: ImageColor,
        bits_per_component: u8,
        #[serde(skip)]
        data: Vec<u8>,
    },
}

/// An image extracted from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Position among the page's image placements (1-indexed)
    pub sequence: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub payload: ImagePayload,
}

impl PageImage {
    /// Create an image holding JPEG bytes.
    pub fn jpeg(page: u32, sequence: u32, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            page,
            sequence,
            width,
            height,
            payload: ImagePayload::Jpeg { data },
        }
    }

    /// Create an image holding raw 8-bit samples.
    pub fn raw(
        page: u32,
        sequence: u32,
        width: u32,
        height: u32,
        color: ImageColor,
        data: Vec<u8>,
    ) -> Self {
        Self {
            page,
            sequence,
            width,
            height,
            payload: ImagePayload::Raw {
                color,
                bits_per_component: 8,
                data,
            },
        }
    }

    /// File extension the image is saved with.
    pub fn file_extension(&self) -> &'static str {
        match self.payload {
            ImagePayload::Jpeg { .. } => "jpg",
            ImagePayload::Raw { .. } => "png",
        }
    }

    /// `page{P}_img{S}.{ext}`
    pub fn suggested_filename(&self) -> String {
        format!(
            "page{}_img{}.{}",
            self.page,
            self.sequence,
            self.file_extension()
        )
    }
}
