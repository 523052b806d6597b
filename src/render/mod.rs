//! Rendering module for converting pages to Markdown and JSON.

mod images;
mod json;
mod markdown;
mod options;
mod result;

pub use images::{encode_png, ImageStore};
pub use json::{to_json, JsonFormat};
pub use markdown::{render_markdown, table_to_markdown, MarkdownRenderer};
pub use options::RenderOptions;
pub use result::{ConversionStats, ConvertResult};
