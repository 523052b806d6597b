//! PDF to Markdown conversion.
//!
//! A conversion makes two passes over the document: the analysis pass
//! collects font sizes into a heading map, the conversion pass lays out each
//! page and renders it.
//!
//! # Example
//!
//! ```no_run
//! use pdf4llm::convert::{ConvertOptions, PdfConverter};
//! use pdf4llm::parser::LopdfBackend;
//! use pdf4llm::progress::ignore_progress;
//!
//! fn main() -> pdf4llm::Result<()> {
//!     let backend = LopdfBackend::load_file("document.pdf")?;
//!     let options = ConvertOptions::new().with_image_dir("out/images");
//!     let result = PdfConverter::new(options).convert(&backend, ignore_progress)?;
//!     println!("{}", result.markdown);
//!     Ok(())
//! }
//! ```

mod pdf;

pub use pdf::PdfConverter;

use std::path::PathBuf;

use crate::fonts::MAX_HEADING_LEVEL;
use crate::parser::TableDetectorConfig;
use crate::render::RenderOptions;

/// Where images go when no directory is configured.
pub const DEFAULT_IMAGE_DIR: &str = "./tmp/images";

/// How a page that cannot be read is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the conversion
    Strict,
    /// Skip the page with a warning and continue
    #[default]
    Lenient,
}

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory to save extracted images
    pub image_dir: PathBuf,

    /// Number of font sizes that may become headings (1-6)
    pub max_heading_levels: u8,

    /// Points a size must exceed the body size by to be a heading
    pub min_heading_delta: f32,

    /// Detect tables from text alignment
    pub detect_tables: bool,

    /// Save images and reference them from the Markdown
    pub extract_images: bool,

    /// Error handling for unreadable pages
    pub error_mode: ErrorMode,

    /// Table detector configuration
    pub table: TableDetectorConfig,

    /// Rendering options
    pub render: RenderOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Set how many heading levels may be assigned.
    pub fn with_max_heading_levels(mut self, levels: u8) -> Self {
        self.max_heading_levels = levels.clamp(1, MAX_HEADING_LEVEL);
        self
    }

    /// Set the minimum size difference over body text for headings.
    pub fn with_min_heading_delta(mut self, delta: f32) -> Self {
        self.min_heading_delta = delta.max(0.0);
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.table = config;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the image path prefix used in the Markdown.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.render = self.render.with_image_prefix(prefix);
        self
    }

    /// Enable or disable `**bold**` emphasis in paragraphs.
    pub fn with_bold_emphasis(mut self, enabled: bool) -> Self {
        self.render = self.render.with_bold_emphasis(enabled);
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            max_heading_levels: MAX_HEADING_LEVEL,
            min_heading_delta: 0.0,
            detect_tables: true,
            extract_images: true,
            error_mode: ErrorMode::default(),
            table: TableDetectorConfig::default(),
            render: RenderOptions::default(),
        }
    }
}
