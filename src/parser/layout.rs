//! Layout analysis for PDF pages.
//!
//! Groups positioned text spans into lines and lines into heading and
//! paragraph blocks, using the document's heading map plus spacing,
//! indentation and sentence-end cues.

use std::cmp::Ordering;

use crate::fonts::HeadingLevelMap;
use crate::model::{BoundingBox, ContentBlock};

use super::text::{ends_sentence, is_spaceless_script_char, join_separator, normalize_span_text};

/// Spans closer than this (in both axes) with equal text are overprints.
const OVERPRINT_TOLERANCE: f32 = 1.0;

/// Upper bound on occupancy slices in column detection.
const MAX_SLICES: usize = 4096;

/// A text span with position and style information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
}

impl TextSpan {
    /// Create a new text span. Bold/italic are derived from the font name.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text,
            x,
            y,
            width: 0.0,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }

    /// Set the advance width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.bottom(), self.right(), self.top())
    }
}

/// Keep only spans that overlap `page`.
///
/// Text drawn outside the MediaBox is never visible and would stretch the
/// layout far beyond the page.
pub fn clip_spans(spans: Vec<TextSpan>, page: &BoundingBox) -> Vec<TextSpan> {
    let total = spans.len();
    let kept: Vec<TextSpan> = spans
        .into_iter()
        .filter(|span| page.intersects(&span.bbox()))
        .collect();
    if kept.len() < total {
        log::debug!("Dropped {} spans outside the page", total - kept.len());
    }
    kept
}

/// Normalize span text and drop blank and overprinted spans.
///
/// Overprinting the same string a fraction of a point apart is a common
/// way to fake bold; only the first copy is kept.
pub fn normalize_spans(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut kept: Vec<TextSpan> = Vec::with_capacity(spans.len());
    let mut dropped = 0usize;

    for mut span in spans {
        span.text = normalize_span_text(&span.text);
        if span.text.trim().is_empty() {
            continue;
        }
        let overprint = kept.iter().any(|k| {
            k.text == span.text
                && (k.x - span.x).abs() < OVERPRINT_TOLERANCE
                && (k.y - span.y).abs() < OVERPRINT_TOLERANCE
        });
        if overprint {
            dropped += 1;
            continue;
        }
        kept.push(span);
    }

    if dropped > 0 {
        log::debug!("Dropped {} overprinted spans", dropped);
    }
    kept
}

/// A text line composed of multiple spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
    /// Heading level from the document's heading map, `None` for body text
    pub heading_level: Option<u8>,
}

/// A piece of line text with the separator that precedes it.
#[derive(Debug, Clone, Copy)]
struct Run<'a> {
    sep: &'static str,
    text: &'a str,
    bold: bool,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let font_size = dominant_font_size(&spans);
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        let x = spans.first().map(|s| s.x).unwrap_or(0.0);

        Self {
            spans,
            y,
            x,
            font_size,
            heading_level: None,
        }
    }

    /// Right edge of the line.
    pub fn right(&self) -> f32 {
        self.spans.iter().map(TextSpan::right).fold(self.x, f32::max)
    }

    pub fn top(&self) -> f32 {
        self.spans.iter().map(TextSpan::top).fold(self.y, f32::max)
    }

    pub fn bottom(&self) -> f32 {
        self.spans.iter().map(TextSpan::bottom).fold(self.y, f32::min)
    }

    /// Get the combined text of all spans with appropriate spacing.
    pub fn text(&self) -> String {
        self.runs().iter().map(|r| format!("{}{}", r.sep, r.text)).collect()
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.is_bold)
            .map(|s| s.text.chars().count())
            .sum();
        let total_chars: usize = self.spans.iter().map(|s| s.text.chars().count()).sum();
        total_chars > 0 && bold_chars * 2 > total_chars
    }

    /// Spans as runs, inserting a space where the gap between two spans is
    /// wider than a fifth of a character. No space between CJK characters.
    fn runs(&self) -> Vec<Run<'_>> {
        let mut runs = Vec::with_capacity(self.spans.len());

        for (i, span) in self.spans.iter().enumerate() {
            let sep = match i.checked_sub(1).map(|p| &self.spans[p]) {
                None => "",
                Some(prev) => {
                    let gap = span.x - prev.right();
                    let char_count = span.text.chars().count();
                    let avg_char_width = if char_count > 0 && span.width > 0.0 {
                        span.width / char_count as f32
                    } else {
                        span.font_size * 0.5
                    };

                    let both_cjk = prev
                        .text
                        .chars()
                        .last()
                        .map(is_spaceless_script_char)
                        .unwrap_or(false)
                        && span
                            .text
                            .chars()
                            .next()
                            .map(is_spaceless_script_char)
                            .unwrap_or(false);

                    if gap > avg_char_width * 0.2 && !both_cjk {
                        join_separator(&prev.text, &span.text)
                    } else {
                        ""
                    }
                }
            };
            runs.push(Run {
                sep,
                text: span.text.as_str(),
                bold: span.is_bold,
            });
        }

        runs
    }
}

/// Size carrying the most characters; ties go to the larger size.
fn dominant_font_size(spans: &[TextSpan]) -> f32 {
    let mut totals: Vec<(f32, usize)> = Vec::new();
    for span in spans {
        let chars = span.text.chars().count();
        match totals
            .iter_mut()
            .find(|(size, _)| (size - span.font_size).abs() < 0.05)
        {
            Some(entry) => entry.1 += chars,
            None => totals.push((span.font_size, chars)),
        }
    }
    totals
        .into_iter()
        .max_by(|a, b| {
            a.1.cmp(&b.1)
                .then(a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        })
        .map(|(size, _)| size)
        .unwrap_or(0.0)
}

/// Type of text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// A heading (H1-H6)
    Heading,
    /// A regular paragraph
    Paragraph,
}

/// A text block (paragraph or heading).
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// The lines in this block
    pub lines: Vec<TextLine>,
    /// Block type
    pub block_type: BlockType,
    /// Heading level (1-6 for headings, 0 otherwise)
    pub heading_level: u8,
}

impl TextBlock {
    /// Create a block; its type follows the first line's heading level.
    pub fn new(lines: Vec<TextLine>) -> Self {
        let level = lines.first().and_then(|l| l.heading_level);
        Self {
            lines,
            block_type: if level.is_some() {
                BlockType::Heading
            } else {
                BlockType::Paragraph
            },
            heading_level: level.unwrap_or(0),
        }
    }

    /// Block text with lines joined by a space (none between CJK characters).
    /// Bold runs are wrapped in `**` when `emphasis` is set.
    pub fn text(&self, emphasis: bool) -> String {
        let mut runs: Vec<Run<'_>> = Vec::new();
        for line in &self.lines {
            let mut line_runs = line.runs();
            if let (Some(prev), Some(first)) = (runs.last(), line_runs.first_mut()) {
                first.sep = join_separator(prev.text, first.text);
            }
            runs.extend(line_runs);
        }
        render_runs(&runs, emphasis).trim().to_string()
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.spans.is_empty())
    }

    pub fn bbox(&self) -> BoundingBox {
        let mut bbox: Option<BoundingBox> = None;
        for line in &self.lines {
            let line_box = BoundingBox::new(line.x, line.bottom(), line.right(), line.top());
            bbox = Some(match bbox {
                Some(b) => b.union(&line_box),
                None => line_box,
            });
        }
        bbox.unwrap_or_default()
    }

    /// Convert into a page content block. `None` when no text remains.
    pub fn into_content_block(self, emphasis: bool) -> Option<ContentBlock> {
        let bbox = self.bbox();
        match self.block_type {
            BlockType::Heading => {
                let text = self.text(false);
                (!text.is_empty()).then(|| ContentBlock::heading(self.heading_level, text, bbox))
            }
            BlockType::Paragraph => {
                let text = self.text(emphasis);
                (!text.is_empty()).then(|| ContentBlock::paragraph(text, bbox))
            }
        }
    }
}

fn render_runs(runs: &[Run<'_>], emphasis: bool) -> String {
    let mut out = String::new();
    let mut current = String::new();
    let mut current_bold = runs.first().map(|r| r.bold).unwrap_or(false);

    for (i, run) in runs.iter().enumerate() {
        if i > 0 && emphasis && run.bold != current_bold {
            push_run(&mut out, &current, current_bold && emphasis);
            current.clear();
            out.push_str(run.sep);
            current_bold = run.bold;
        } else {
            current.push_str(run.sep);
        }
        current.push_str(run.text);
    }
    push_run(&mut out, &current, current_bold && emphasis);
    out
}

/// Append `text`, wrapping its non-blank core in `**` when bold.
fn push_run(out: &mut String, text: &str, bold: bool) {
    let core = text.trim();
    if !bold || core.is_empty() {
        out.push_str(text);
        return;
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();
    out.push_str(&text[..start]);
    out.push_str("**");
    out.push_str(core);
    out.push_str("**");
    out.push_str(&text[end..]);
}

/// A detected column in the page layout.
#[derive(Debug, Clone)]
pub struct Column {
    /// Left boundary X coordinate
    pub left: f32,
    /// Right boundary X coordinate
    pub right: f32,
    /// Column index (0 = leftmost)
    pub index: usize,
}

impl Column {
    /// Check if an X coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// A span belongs to a column if its left edge or its center is inside.
    pub fn contains_span(&self, span: &TextSpan) -> bool {
        let center = span.x + span.width / 2.0;
        self.contains(span.x) || self.contains(center)
    }
}

/// Groups a page's spans into heading and paragraph blocks.
pub struct LayoutAnalyzer<'a> {
    headings: &'a HeadingLevelMap,
    bold_emphasis: bool,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(headings: &'a HeadingLevelMap) -> Self {
        Self {
            headings,
            bold_emphasis: true,
        }
    }

    /// Wrap bold runs of paragraphs in `**`.
    pub fn with_bold_emphasis(mut self, enabled: bool) -> Self {
        self.bold_emphasis = enabled;
        self
    }

    /// Turn a page's (normalized) spans into heading and paragraph blocks.
    pub fn analyze(&self, spans: Vec<TextSpan>) -> Vec<ContentBlock> {
        self.extract_blocks(spans)
            .into_iter()
            .filter_map(|b| b.into_content_block(self.bold_emphasis))
            .collect()
    }

    /// Blocks per column, left column first.
    pub fn extract_blocks(&self, spans: Vec<TextSpan>) -> Vec<TextBlock> {
        self.lines_by_column(spans)
            .into_iter()
            .flat_map(|mut lines| {
                self.assign_heading_levels(&mut lines);
                self.group_lines_into_blocks(lines)
            })
            .collect()
    }

    /// Group spans into lines, top to bottom, respecting column boundaries.
    ///
    /// Text on the same baseline in different columns ends up in separate
    /// lines, ordered left to right.
    pub fn group_spans_into_lines(&self, spans: Vec<TextSpan>) -> Vec<TextLine> {
        let mut all_lines: Vec<(usize, TextLine)> = self
            .lines_by_column(spans)
            .into_iter()
            .enumerate()
            .flat_map(|(col, lines)| lines.into_iter().map(move |l| (col, l)))
            .collect();

        all_lines.sort_by(|(col_a, a), (col_b, b)| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then(col_a.cmp(col_b))
        });
        all_lines.into_iter().map(|(_, line)| line).collect()
    }

    fn lines_by_column(&self, spans: Vec<TextSpan>) -> Vec<Vec<TextLine>> {
        if spans.is_empty() {
            return vec![];
        }

        let columns = detect_columns(&spans);
        log::debug!("Detected {} columns", columns.len());

        if columns.len() <= 1 {
            return vec![group_spans_single_column(spans)];
        }

        let mut column_spans: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len()];
        for span in spans {
            let col_idx = columns
                .iter()
                .position(|c| c.contains_span(&span))
                .unwrap_or(0);
            column_spans[col_idx].push(span);
        }

        column_spans
            .into_iter()
            .map(group_spans_single_column)
            .collect()
    }

    /// Look up each line's dominant size in the heading map.
    pub fn assign_heading_levels(&self, lines: &mut [TextLine]) {
        for line in lines {
            line.heading_level = self.headings.level_for(line.font_size);
        }
    }

    /// Group consecutive lines (of one column) into blocks.
    pub fn group_lines_into_blocks(&self, lines: Vec<TextLine>) -> Vec<TextBlock> {
        if lines.is_empty() {
            return vec![];
        }

        let avg_spacing = calculate_avg_line_spacing(&lines);
        let mut blocks: Vec<TextBlock> = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();
        let mut widest_right = f32::MIN;

        for line in lines {
            if let Some(prev) = current.last() {
                if should_break_block(prev, &line, avg_spacing, widest_right) {
                    blocks.push(TextBlock::new(std::mem::take(&mut current)));
                    widest_right = f32::MIN;
                }
            }
            widest_right = widest_right.max(line.right());
            current.push(line);
        }

        if !current.is_empty() {
            blocks.push(TextBlock::new(current));
        }

        blocks
    }
}

/// Simple Y-based line grouping for single-column layout.
fn group_spans_single_column(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF Y grows upwards: top of page first
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Calculate average baseline distance between consecutive lines.
fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Determine if `curr` starts a new block after `prev`.
///
/// `widest_right` is the right edge of the widest line of the current block.
fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32, widest_right: f32) -> bool {
    if prev.heading_level != curr.heading_level {
        return true;
    }

    let spacing = (prev.y - curr.y).abs();
    if spacing > avg_spacing * 1.5 || spacing > prev.font_size.max(curr.font_size) * 2.0 {
        return true;
    }

    if (prev.font_size - curr.font_size).abs() > 1.0 {
        return true;
    }

    if (prev.x - curr.x).abs() > 20.0 {
        return true;
    }

    // A short line closing a sentence ends its paragraph.
    ends_sentence(&prev.text()) && prev.right() < widest_right * 0.9
}

/// Detect columns in a page based on vertical gap (gutter) detection.
///
/// This looks for vertical empty spaces between text regions to identify
/// column boundaries. Returns columns sorted from left to right.
pub fn detect_columns(spans: &[TextSpan]) -> Vec<Column> {
    if spans.is_empty() {
        return vec![];
    }

    let min_x = spans.iter().map(|s| s.x).fold(f32::MAX, f32::min);
    let max_x = spans.iter().map(TextSpan::right).fold(f32::MIN, f32::max);
    let single = || {
        vec![Column {
            left: min_x - 10.0,
            right: max_x + 10.0,
            index: 0,
        }]
    };

    let page_width = max_x - min_x;
    if !page_width.is_finite() || page_width < 250.0 {
        return single();
    }

    // Occupancy of vertical slices, 3pt wide unless the text is very wide
    let slice_width = (page_width / MAX_SLICES as f32).max(3.0);
    let num_slices = ((page_width / slice_width) as usize).min(MAX_SLICES) + 1;
    let mut slice_occupancy = vec![0usize; num_slices];

    for span in spans {
        let start_slice = ((span.x - min_x) / slice_width) as usize;
        let end_slice = ((span.right() - min_x) / slice_width) as usize;

        for slot in slice_occupancy
            .iter_mut()
            .take(end_slice.min(num_slices - 1) + 1)
            .skip(start_slice)
        {
            *slot += 1;
        }
    }

    // Largest empty run in the middle 70% of the page, preferring the center
    let search_start = num_slices * 15 / 100;
    let search_end = num_slices * 85 / 100;
    let page_center = num_slices / 2;

    let mut best_gap_start = 0;
    let mut best_gap_len = 0;
    let mut best_gap_center_dist = f32::MAX;
    let mut current_gap_start = 0;
    let mut current_gap_len = 0;

    let mut consider = |gap_start: usize, gap_len: usize| {
        let gap_center = gap_start + gap_len / 2;
        let center_dist = (gap_center as i32 - page_center as i32).abs() as f32;
        let gap_width = gap_len as f32 * slice_width;
        let best_width = best_gap_len as f32 * slice_width;

        if gap_width >= 10.0
            && (gap_width > best_width * 1.5
                || (gap_width >= best_width * 0.7 && center_dist < best_gap_center_dist))
        {
            best_gap_start = gap_start;
            best_gap_len = gap_len;
            best_gap_center_dist = center_dist;
        }
    };

    for (i, &occupancy) in slice_occupancy
        .iter()
        .enumerate()
        .take(search_end)
        .skip(search_start)
    {
        if occupancy == 0 {
            if current_gap_len == 0 {
                current_gap_start = i;
            }
            current_gap_len += 1;
        } else {
            if current_gap_len > 0 {
                consider(current_gap_start, current_gap_len);
            }
            current_gap_len = 0;
        }
    }
    if current_gap_len > 0 {
        consider(current_gap_start, current_gap_len);
    }

    let gap_width = best_gap_len as f32 * slice_width;
    if gap_width < 12.0 {
        return single();
    }

    let gutter_center = min_x + (best_gap_start as f32 + best_gap_len as f32 / 2.0) * slice_width;
    let left_col_width = gutter_center - min_x;
    let right_col_width = max_x - gutter_center;
    if left_col_width < 80.0 || right_col_width < 80.0 {
        log::debug!("Column too narrow, treating as single column");
        return single();
    }

    // Both columns need a fair share of the spans
    let left_spans = spans
        .iter()
        .filter(|s| s.x + s.width / 2.0 < gutter_center)
        .count();
    let right_spans = spans.len() - left_spans;
    let min_spans = (spans.len() / 10).max(2);
    if left_spans < min_spans || right_spans < min_spans {
        log::debug!("Spans too imbalanced, treating as single column");
        return single();
    }

    log::debug!(
        "Gutter at x={:.1} ({:.1}pt wide), spans left={}, right={}",
        gutter_center,
        gap_width,
        left_spans,
        right_spans
    );

    vec![
        Column {
            left: min_x - 10.0,
            right: gutter_center,
            index: 0,
        },
        Column {
            left: gutter_center,
            right: max_x + 10.0,
            index: 1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontStatistics;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size, "Helvetica".to_string())
            .with_width(text.chars().count() as f32 * size * 0.5)
    }

    fn bold(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size, "Helvetica-Bold".to_string())
            .with_width(text.chars().count() as f32 * size * 0.5)
    }

    fn heading_map(sizes: &[(f32, usize)]) -> HeadingLevelMap {
        let mut stats = FontStatistics::new();
        for (size, count) in sizes {
            for _ in 0..*count {
                stats.add_size(*size);
            }
        }
        HeadingLevelMap::from_statistics(&stats, 6, 0.0)
    }

    fn texts(blocks: &[ContentBlock]) -> Vec<String> {
        blocks
            .iter()
            .map(|b| match b {
                ContentBlock::Heading { level, text, .. } => format!("H{} {}", level, text),
                ContentBlock::Paragraph { text, .. } => text.clone(),
                other => other.kind().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_text_span_bold_detection() {
        let span = TextSpan::new("Test".into(), 0.0, 0.0, 12.0, "Helvetica-Bold".into());
        assert!(span.is_bold);
        assert!(!span.is_italic);

        let span = TextSpan::new("Test".into(), 0.0, 0.0, 12.0, "Helvetica-Oblique".into());
        assert!(!span.is_bold);
        assert!(span.is_italic);
    }

    #[test]
    fn test_normalize_spans_dedupes_overprint() {
        let spans = vec![
            span("Bold", 72.0, 700.0, 12.0),
            span("Bold", 72.4, 700.2, 12.0),
            span("   ", 100.0, 700.0, 12.0),
            span("\u{FB01}le", 72.0, 680.0, 12.0),
        ];
        let spans = normalize_spans(spans);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].text, "file");
    }

    #[test]
    fn test_line_text_spacing() {
        let line = TextLine::from_spans(vec![
            span("world", 110.0, 700.0, 12.0),
            span("Hello", 72.0, 700.0, 12.0),
        ]);
        assert_eq!(line.text(), "Hello world");

        let cjk = TextLine::from_spans(vec![
            span("中文", 72.0, 700.0, 12.0),
            span("内容", 100.0, 700.0, 12.0),
        ]);
        assert_eq!(cjk.text(), "中文内容");
    }

    #[test]
    fn test_dominant_font_size() {
        let line = TextLine::from_spans(vec![
            span("B", 72.0, 700.0, 30.0),
            span("ig drop cap paragraph", 90.0, 700.0, 12.0),
        ]);
        assert_eq!(line.font_size, 12.0);
    }

    #[test]
    fn test_group_spans_into_lines() {
        let map = HeadingLevelMap::default();
        let analyzer = LayoutAnalyzer::new(&map);
        let lines = analyzer.group_spans_into_lines(vec![
            span("second", 72.0, 686.0, 12.0),
            span("first", 72.0, 700.0, 12.0),
            span("line", 110.0, 700.5, 12.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "first line");
        assert_eq!(lines[1].text(), "second");
    }

    #[test]
    fn test_heading_then_paragraphs() {
        let map = heading_map(&[(24.0, 1), (12.0, 3)]);
        let blocks = LayoutAnalyzer::new(&map).analyze(vec![
            span("Title", 72.0, 720.0, 24.0),
            span("para one", 72.0, 690.0, 12.0),
            span("para two", 72.0, 660.0, 12.0),
            span("para three", 72.0, 630.0, 12.0),
        ]);
        assert_eq!(
            texts(&blocks),
            vec!["H1 Title", "para one", "para two", "para three"]
        );
    }

    #[test]
    fn test_wrapped_lines_join_into_paragraph() {
        let map = heading_map(&[(12.0, 4)]);
        let blocks = LayoutAnalyzer::new(&map).analyze(vec![
            span("The quick brown fox", 72.0, 700.0, 12.0),
            span("jumps over the lazy", 72.0, 686.0, 12.0),
            span("dog.", 72.0, 672.0, 12.0),
            span("Next paragraph here", 72.0, 658.0, 12.0),
        ]);
        assert_eq!(
            texts(&blocks),
            vec![
                "The quick brown fox jumps over the lazy dog.",
                "Next paragraph here"
            ]
        );
    }

    #[test]
    fn test_multiline_heading_stays_together() {
        let map = heading_map(&[(20.0, 2), (10.0, 10)]);
        let blocks = LayoutAnalyzer::new(&map).analyze(vec![
            span("A long chapter", 72.0, 720.0, 20.0),
            span("title", 72.0, 696.0, 20.0),
            span("Body text", 72.0, 670.0, 10.0),
        ]);
        assert_eq!(texts(&blocks), vec!["H1 A long chapter title", "Body text"]);
    }

    #[test]
    fn test_bold_runs_are_emphasized() {
        let map = heading_map(&[(12.0, 3)]);
        let spans = vec![
            span("Note:", 72.0, 700.0, 12.0),
            bold("important", 110.0, 700.0, 12.0),
            span("detail", 170.0, 700.0, 12.0),
        ];
        let blocks = LayoutAnalyzer::new(&map).analyze(spans.clone());
        assert_eq!(texts(&blocks), vec!["Note: **important** detail"]);

        let plain = LayoutAnalyzer::new(&map)
            .with_bold_emphasis(false)
            .analyze(spans);
        assert_eq!(texts(&plain), vec!["Note: important detail"]);
    }

    #[test]
    fn test_headings_are_not_emphasized() {
        let map = heading_map(&[(18.0, 1), (10.0, 5)]);
        let blocks = LayoutAnalyzer::new(&map).analyze(vec![bold("Summary", 72.0, 700.0, 18.0)]);
        assert_eq!(texts(&blocks), vec!["H1 Summary"]);
    }

    #[test]
    fn test_cjk_lines_join_without_space() {
        let map = heading_map(&[(12.0, 2)]);
        let blocks = LayoutAnalyzer::new(&map).analyze(vec![
            span("这是第一行文字", 72.0, 700.0, 12.0),
            span("这是第二行", 72.0, 686.0, 12.0),
        ]);
        assert_eq!(texts(&blocks), vec!["这是第一行文字这是第二行"]);
    }

    #[test]
    fn test_two_columns_are_not_merged_into_lines() {
        let map = heading_map(&[(10.0, 20)]);
        let mut spans = Vec::new();
        for i in 0..5 {
            let y = 700.0 - i as f32 * 12.0;
            spans.push(span("left column text here", 50.0, y, 10.0));
            spans.push(span("right column text here", 350.0, y, 10.0));
        }
        let analyzer = LayoutAnalyzer::new(&map);
        let columns = detect_columns(&spans);
        assert_eq!(columns.len(), 2);

        let lines = analyzer.group_spans_into_lines(spans.clone());
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.spans.len() == 1));

        let blocks = analyzer.extract_blocks(spans);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_column_detection_with_far_off_page_span() {
        let mut spans: Vec<TextSpan> = (0..5)
            .map(|i| span("body text line", 72.0, 700.0 - i as f32 * 14.0, 10.0))
            .collect();
        spans.push(span("hidden", 5e10, 700.0, 10.0));
        // Width is bounded by MAX_SLICES, whatever the coordinates
        let columns = detect_columns(&spans);
        assert!(!columns.is_empty());

        spans.push(span("broken", f32::INFINITY, 690.0, 10.0));
        assert_eq!(detect_columns(&spans).len(), 1);
    }

    #[test]
    fn test_clip_spans_drops_text_outside_page() {
        let page = BoundingBox::new(0.0, 0.0, 612.0, 792.0);
        let spans = vec![
            span("visible", 72.0, 700.0, 12.0),
            span("far right", 5e10, 700.0, 12.0),
            span("below", 72.0, -400.0, 12.0),
            span("edge", 600.0, 10.0, 12.0),
        ];
        let kept = clip_spans(spans, &page);
        let texts: Vec<&str> = kept.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["visible", "edge"]);
    }

    #[test]
    fn test_column_contains_span() {
        let col = Column {
            left: 100.0,
            right: 200.0,
            index: 0,
        };
        assert!(col.contains(100.0));
        assert!(!col.contains(201.0));

        let inside = span("Test", 120.0, 0.0, 12.0).with_width(50.0);
        assert!(col.contains_span(&inside));

        // center at 110
        let straddling = span("Test", 90.0, 0.0, 12.0).with_width(40.0);
        assert!(col.contains_span(&straddling));

        let outside = span("Test", 250.0, 0.0, 12.0).with_width(30.0);
        assert!(!col.contains_span(&outside));
    }

    #[test]
    fn test_block_bbox() {
        let map = heading_map(&[(12.0, 2)]);
        let analyzer = LayoutAnalyzer::new(&map);
        let blocks = analyzer.extract_blocks(vec![
            span("abcd", 72.0, 700.0, 10.0),
            span("abcdefgh", 72.0, 688.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 1);
        let bbox = blocks[0].bbox();
        assert_eq!(bbox.left, 72.0);
        assert_eq!(bbox.right, 112.0);
        assert_eq!(bbox.top, 708.0);
        assert_eq!(bbox.bottom, 686.0);
    }
}
