//! # pdf4llm
//!
//! Convert PDF documents to Markdown for language models.
//!
//! Headings are inferred from font sizes: the most common size is body text
//! and the largest sizes above it become `#` to `######`. Tables detected
//! from text alignment become GitHub-flavored pipe tables, and images are
//! saved next to the output and referenced with `![](path)`.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pdf4llm::Result<()> {
//!     let markdown = pdf4llm::to_markdown("document.pdf")?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Progress
//!
//! ```no_run
//! use pdf4llm::{ConvertOptions, ProgressInfo};
//!
//! fn main() -> pdf4llm::Result<()> {
//!     let options = ConvertOptions::new().with_image_dir("out/images");
//!     let markdown = pdf4llm::to_markdown_with_progress("document.pdf", &options, |p: &ProgressInfo| {
//!         eprintln!("{} {:.0}%", p.phase, p.percentage);
//!         Ok(())
//!     })?;
//!     std::fs::write("out/document.md", markdown)?;
//!     Ok(())
//! }
//! ```

pub mod convert;
pub mod detect;
pub mod error;
pub mod fonts;
pub mod model;
pub mod parser;
pub mod progress;
pub mod render;

// Re-export commonly used types
pub use convert::{ConvertOptions, ErrorMode, PdfConverter, DEFAULT_IMAGE_DIR};
pub use detect::{check_pdf_file, is_pdf_bytes, pdf_version};
pub use error::{CallbackError, Error, Result};
pub use fonts::{FontStatistics, HeadingLevelMap};
pub use model::{BoundingBox, ContentBlock, Page, PageImage, Table, TableRow};
pub use parser::{LopdfBackend, PdfBackend, TableDetectorConfig};
pub use progress::{ProcessPhase, ProgressInfo};
pub use render::{ConversionStats, ConvertResult, JsonFormat, RenderOptions};

use std::path::Path;

use progress::ignore_progress;

/// Convert a PDF file to Markdown with default options.
///
/// Images are written to [`DEFAULT_IMAGE_DIR`].
///
/// # Example
///
/// ```no_run
/// let markdown = pdf4llm::to_markdown("document.pdf").unwrap();
/// println!("{}", markdown);
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    to_markdown_with_options(path, &ConvertOptions::default())
}

/// Convert a PDF file to Markdown with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf4llm::ConvertOptions;
///
/// let options = ConvertOptions::new().with_images(false).with_max_heading_levels(3);
/// let markdown = pdf4llm::to_markdown_with_options("document.pdf", &options).unwrap();
/// ```
pub fn to_markdown_with_options<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<String> {
    convert_file(path, options, ignore_progress).map(|r| r.markdown)
}

/// Convert a PDF file to Markdown, reporting progress after every page of
/// both phases. An error returned by `callback` aborts the conversion as
/// [`Error::Callback`].
pub fn to_markdown_with_progress<P, F>(path: P, options: &ConvertOptions, callback: F) -> Result<String>
where
    P: AsRef<Path>,
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    convert_file(path, options, callback).map(|r| r.markdown)
}

/// Convert a PDF file, returning the Markdown with its heading map and
/// statistics.
///
/// The input is checked before anything is written: a missing file fails
/// with [`Error::FileNotFound`] and no image directory is created.
pub fn convert_file<P, F>(path: P, options: &ConvertOptions, callback: F) -> Result<ConvertResult>
where
    P: AsRef<Path>,
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    let backend = open(path.as_ref())?;
    PdfConverter::new(options.clone()).convert(&backend, callback)
}

/// Convert PDF bytes held in memory.
pub fn convert_bytes<F>(data: &[u8], options: &ConvertOptions, callback: F) -> Result<ConvertResult>
where
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    pdf_version(data)?;
    let backend = LopdfBackend::load_bytes(data)?;
    PdfConverter::new(options.clone()).convert(&backend, callback)
}

/// Run only the font analysis and return the heading map.
///
/// # Example
///
/// ```no_run
/// use pdf4llm::ConvertOptions;
///
/// let map = pdf4llm::analyze_fonts("document.pdf", &ConvertOptions::default()).unwrap();
/// for (size, level) in map.headings() {
///     println!("{:.1}pt -> H{}", size, level);
/// }
/// ```
pub fn analyze_fonts<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<HeadingLevelMap> {
    let backend = open(path.as_ref())?;
    PdfConverter::new(options.clone()).analyze_fonts(&backend, ignore_progress)
}

/// Lay out every page without rendering or writing images.
pub fn extract_pages<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Vec<Page>> {
    let backend = open(path.as_ref())?;
    PdfConverter::new(options.clone()).extract_pages(&backend, ignore_progress)
}

/// Dump the page/block model of a PDF file as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, options: &ConvertOptions, format: JsonFormat) -> Result<String> {
    let pages = extract_pages(path, options)?;
    render::to_json(&pages, format)
}

fn open(path: &Path) -> Result<LopdfBackend> {
    let version = check_pdf_file(path)?;
    log::debug!("Opening {} (PDF {})", path.display(), version);
    LopdfBackend::load_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_creates_nothing() {
        let dir = tempdir().unwrap();
        let image_dir = dir.path().join("images");
        let options = ConvertOptions::new().with_image_dir(&image_dir);

        let err = convert_file(dir.path().join("missing.pdf"), &options, ignore_progress)
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(err.is_not_found());
        assert!(!image_dir.exists());
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, "just some text").unwrap();

        let err = to_markdown_with_options(&path, &ConvertOptions::new().with_images(false))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_convert_bytes_rejects_garbage() {
        let err = convert_bytes(b"GIF89a", &ConvertOptions::default(), ignore_progress).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_corrupt_pdf_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.7\nthis is not really a pdf").unwrap();

        // Never panics; either rejected or read as a document with no text
        match analyze_fonts(&path, &ConvertOptions::default()) {
            Err(err) => assert!(matches!(err, Error::PdfParse(_) | Error::Io(_))),
            Ok(map) => assert!(map.is_empty()),
        }
    }
}
