//! Page model types.
//!
//! This module defines the intermediate representation that bridges
//! page layout analysis and Markdown rendering.

mod block;
mod image;
mod page;
mod table;

pub use block::{sort_reading_order, BoundingBox, ContentBlock};
pub use image::{ImageColor, ImagePayload, PageImage};
pub use page::Page;
pub use table::{Table, TableRow};
