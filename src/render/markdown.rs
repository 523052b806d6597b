//! Markdown rendering of converted pages.

use crate::model::{ContentBlock, Page, PageImage, Table};

use super::{ConversionStats, ImageStore, RenderOptions};

/// Render pages to Markdown without writing images.
///
/// Image blocks are dropped; use [`MarkdownRenderer::with_image_store`] to
/// save and reference them.
pub fn render_markdown(pages: &[Page], options: &RenderOptions) -> String {
    let mut renderer = MarkdownRenderer::new(options.clone());
    for page in pages {
        renderer.render_page(page);
    }
    renderer.finish().0
}

/// Incremental Markdown renderer, fed one page at a time.
///
/// Every block is followed by a blank line; [`finish`](Self::finish) trims
/// trailing whitespace and ends the document with a single newline.
pub struct MarkdownRenderer<'a> {
    options: RenderOptions,
    images: Option<&'a mut ImageStore>,
    output: String,
    stats: ConversionStats,
}

impl<'a> MarkdownRenderer<'a> {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            images: None,
            output: String::new(),
            stats: ConversionStats::new(),
        }
    }

    /// Save image blocks into `store` and reference them.
    pub fn with_image_store(mut self, store: &'a mut ImageStore) -> Self {
        self.images = Some(store);
        self
    }

    /// Append a page's blocks in order.
    pub fn render_page(&mut self, page: &Page) {
        self.stats.pages += 1;
        for block in &page.blocks {
            self.render_block(block);
        }
    }

    /// Count a page that was skipped.
    pub fn skip_page(&mut self) {
        self.stats.skipped_pages += 1;
    }

    /// Count an image that could not be extracted.
    pub fn skip_image(&mut self) {
        self.stats.skipped_images += 1;
    }

    /// The finished document and what went into it.
    pub fn finish(self) -> (String, ConversionStats) {
        let trimmed = self.output.trim_end();
        let markdown = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\n", trimmed)
        };
        (markdown, self.stats)
    }

    fn render_block(&mut self, block: &ContentBlock) {
        match block {
            ContentBlock::Heading { level, text, .. } => {
                if text.trim().is_empty() {
                    return;
                }
                let level = (*level).clamp(1, 6) as usize;
                self.output.push_str(&"#".repeat(level));
                self.output.push(' ');
                self.output.push_str(text.trim());
            }
            ContentBlock::Paragraph { text, .. } => {
                if text.trim().is_empty() {
                    return;
                }
                self.output.push_str(text.trim());
            }
            ContentBlock::Table { table, .. } => {
                if table.is_empty() {
                    return;
                }
                self.output.push_str(&table_to_markdown(table));
            }
            ContentBlock::Image { image, .. } => {
                if !self.render_image(image) {
                    return;
                }
            }
        }
        self.stats.record(block);
        self.output.push_str("\n\n");
    }

    fn render_image(&mut self, image: &PageImage) -> bool {
        let Some(store) = self.images.as_deref_mut() else {
            log::debug!("No image store, dropping {}", image.suggested_filename());
            return false;
        };

        match store.save(image) {
            Ok(filename) => {
                let path = store.reference(&filename, self.options.image_path_prefix.as_deref());
                self.output.push_str(&format!("![]({})", path));
                true
            }
            Err(e) => {
                log::warn!(
                    "Skipping image {} on page {}: {}",
                    image.sequence,
                    image.page,
                    e
                );
                self.stats.skipped_images += 1;
                false
            }
        }
    }
}

/// Render a table as a GitHub-flavored pipe table.
///
/// The first row is the header, followed by a `---` separator row. Every
/// row has exactly as many cells as the widest row, so a table of N rows
/// produces N+1 lines. No trailing newline.
pub fn table_to_markdown(table: &Table) -> String {
    let columns = table.column_count();
    if columns == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(table.row_count() + 1);
    for (i, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = (0..columns)
            .map(|c| row.cells.get(c).map(|s| escape_cell(s)).unwrap_or_default())
            .collect();
        lines.push(format_row(&cells));

        if i == 0 {
            lines.push(format_row(&vec!["---".to_string(); columns]));
        }
    }

    lines.join("\n")
}

fn format_row(cells: &[String]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        if cell.is_empty() {
            line.push_str("  |");
        } else {
            line.push(' ');
            line.push_str(cell);
            line.push_str(" |");
        }
    }
    line
}

/// Cell text on one line with pipes escaped.
fn escape_cell(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
