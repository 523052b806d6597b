//! PDF parsing module.
//!
//! The backend reads the document, the interpreter turns content streams
//! into positioned spans, and layout analysis groups those into blocks.

mod backend;
mod interpreter;
mod layout;
mod table_detector;
mod text;

pub use backend::{
    BackendFontInfo, ContentOp, ImageXObject, LopdfBackend, PageId, PdfBackend, PdfValue,
    DEFAULT_PAGE_BOX,
};
pub use interpreter::{interpret_page, ImagePlacement, Matrix, PageContent};
pub use layout::{
    clip_spans, detect_columns, normalize_spans, BlockType, Column, LayoutAnalyzer, TextBlock, TextLine,
    TextSpan,
};
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig};
pub use text::{ends_sentence, is_hierarchical_number, is_spaceless_script_char};
