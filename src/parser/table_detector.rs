//! Table detection from text alignment.
//!
//! Tables are found without ruling lines: spans are bucketed into rows by
//! baseline, column edges are the left edges that line up across rows, and
//! runs of well-aligned rows become tables.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::{BoundingBox, Table, TableRow};

use super::layout::TextSpan;
use super::text::is_hierarchical_number;

/// Slack allowed when checking that a table lies on its page.
const PAGE_TOLERANCE: f32 = 1.0;

/// A detected table with its placement on the page.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Area covered by the table's spans
    pub bbox: BoundingBox,
    /// Left edges of the columns
    pub columns: Vec<f32>,
    /// Cell text, first row is the header
    pub table: Table,
}

/// A row of spans, stored as indices into the detector's input.
#[derive(Debug, Clone)]
struct SpanRow {
    members: Vec<usize>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables anywhere in `spans`.
    ///
    /// Returns the tables and the spans that were NOT claimed by a table.
    pub fn detect(&self, spans: Vec<TextSpan>) -> (Vec<DetectedTable>, Vec<TextSpan>) {
        self.detect_within(spans, None)
    }

    /// Detect tables, discarding any that fall outside `page` or contain no
    /// text. Spans of discarded tables stay in the returned text flow.
    pub fn detect_within(
        &self,
        spans: Vec<TextSpan>,
        page: Option<&BoundingBox>,
    ) -> (Vec<DetectedTable>, Vec<TextSpan>) {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return (vec![], spans);
        }

        let rows = self.group_into_rows(&spans);
        if rows.len() < self.config.min_rows {
            return (vec![], spans);
        }

        let columns = self.detect_columns(&spans, &rows);
        log::debug!(
            "TableDetector: {} rows, column edges {:?}",
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return (vec![], spans);
        }

        let mut tables = Vec::new();
        let mut claimed: HashSet<usize> = HashSet::new();

        for (start, end) in self.find_table_regions(&spans, &rows, &columns) {
            let region = &rows[start..=end];

            // Column edges local to this region
            let table_columns = self.detect_columns(&spans, region);
            if table_columns.len() < self.config.min_columns {
                continue;
            }
            if table_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping region, too many columns ({} > {})",
                    table_columns.len(),
                    self.config.max_columns
                );
                continue;
            }
            if self.is_list_pattern(&spans, region, &table_columns) {
                log::debug!("TableDetector: skipping region, detected as list pattern");
                continue;
            }

            let bbox = region_bbox(&spans, region);
            if let Some(page) = page {
                if !page.contains(&bbox, PAGE_TOLERANCE) {
                    log::debug!("TableDetector: skipping region outside page: {:?}", bbox);
                    continue;
                }
            }

            let table = self.build_table(&spans, region, &table_columns, bbox.right);
            if table.is_empty() {
                continue;
            }

            claimed.extend(region.iter().flat_map(|r| r.members.iter().copied()));
            tables.push(DetectedTable {
                bbox,
                columns: table_columns,
                table,
            });
        }

        let remaining = spans
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !claimed.contains(i))
            .map(|(_, span)| span)
            .collect();

        (tables, remaining)
    }

    /// Group spans into rows by baseline, top row first.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<SpanRow> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&spans[a], &spans[b]);
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let mut rows: Vec<SpanRow> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_y: Option<f32> = None;

        for idx in order {
            let span = &spans[idx];
            let y_tolerance = span.font_size * self.config.y_tolerance_factor;

            match current_y {
                Some(y) if (span.y - y).abs() <= y_tolerance => current.push(idx),
                _ => {
                    if !current.is_empty() {
                        rows.push(SpanRow {
                            members: std::mem::take(&mut current),
                        });
                    }
                    current_y = Some(span.y);
                    current.push(idx);
                }
            }
        }
        if !current.is_empty() {
            rows.push(SpanRow { members: current });
        }

        rows
    }

    /// Column edges: left edges (in 5pt buckets) shared by enough rows.
    ///
    /// Only rows with two or more spans vote when there are enough of them;
    /// otherwise every span votes.
    fn detect_columns(&self, spans: &[TextSpan], rows: &[SpanRow]) -> Vec<f32> {
        const BUCKET: f32 = 5.0;

        let multi_span: Vec<&SpanRow> = rows.iter().filter(|r| r.members.len() >= 2).collect();
        let per_row = multi_span.len() >= self.config.min_rows;

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        let voters = if per_row {
            for row in &multi_span {
                let buckets: HashSet<i32> = row
                    .members
                    .iter()
                    .map(|&i| (spans[i].x / BUCKET).round() as i32)
                    .collect();
                for bucket in buckets {
                    *edge_counts.entry(bucket).or_insert(0) += 1;
                }
            }
            multi_span.len()
        } else {
            for &i in rows.iter().flat_map(|r| r.members.iter()) {
                *edge_counts.entry((spans[i].x / BUCKET).round() as i32).or_insert(0) += 1;
            }
            rows.len()
        };

        let min_occurrences =
            ((voters as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * BUCKET)
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut merged: Vec<f32> = Vec::with_capacity(edges.len());
        for edge in edges {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Contiguous runs of at least `min_rows` well-aligned rows.
    fn find_table_regions(
        &self,
        spans: &[TextSpan],
        rows: &[SpanRow],
        columns: &[f32],
    ) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            // A lone aligned span is a text line, not a row: it ends the region
            if occupied_columns(spans, row, columns) >= self.config.min_columns
                && alignment_score(spans, row, columns) >= self.config.min_alignment_ratio
            {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Fill one cell per column; spans sharing a cell are joined with a space.
    fn build_table(
        &self,
        spans: &[TextSpan],
        rows: &[SpanRow],
        columns: &[f32],
        right_x: f32,
    ) -> Table {
        let mut table = Table::new();
        for row in rows {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for &i in &row.members {
                let span = &spans[i];
                let col = find_column_for_span(span.x, columns, right_x);
                let text = span.text.trim();
                if !text.is_empty() {
                    cells[col].push(text);
                }
            }
            table.add_row(TableRow::new(
                cells.into_iter().map(|parts| parts.join(" ")).collect(),
            ));
        }
        table
    }

    /// Whether the region is really a bulleted or numbered list.
    ///
    /// A list marker and its item text often land in separate spans at two
    /// x positions, which looks like a two-column table.
    fn is_list_pattern(&self, spans: &[TextSpan], rows: &[SpanRow], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0usize;
        let mut numbers = 0usize;
        for row in rows {
            let first = row.members.iter().map(|&i| &spans[i]).min_by(|a, b| {
                a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal)
            });
            if let Some(span) = first {
                let text = span.text.trim();
                if is_bullet_marker(text) {
                    bullets += 1;
                } else if is_number_marker(text) {
                    numbers += 1;
                }
            }
        }

        let bullet_ratio = bullets as f32 / rows.len() as f32;
        let marker_ratio = (bullets + numbers) as f32 / rows.len() as f32;
        log::debug!(
            "TableDetector: list markers bullets={}, numbers={}, rows={}",
            bullets,
            numbers,
            rows.len()
        );

        // Real tables can have a numbered first column, but rarely only two columns.
        bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
    }
}

/// Number of distinct column edges the row's spans start at (within 5pt).
fn occupied_columns(spans: &[TextSpan], row: &SpanRow, columns: &[f32]) -> usize {
    let occupied: HashSet<usize> = row
        .members
        .iter()
        .filter_map(|&i| columns.iter().position(|col| (spans[i].x - col).abs() <= 5.0))
        .collect();
    occupied.len()
}

/// Share of the row's spans starting within 5pt of a column edge.
fn alignment_score(spans: &[TextSpan], row: &SpanRow, columns: &[f32]) -> f32 {
    if row.members.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .members
        .iter()
        .filter(|&&i| columns.iter().any(|col| (spans[i].x - col).abs() <= 5.0))
        .count();
    aligned as f32 / row.members.len() as f32
}

fn region_bbox(spans: &[TextSpan], rows: &[SpanRow]) -> BoundingBox {
    rows.iter()
        .flat_map(|r| r.members.iter())
        .map(|&i| spans[i].bbox())
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default()
}

/// Column whose range holds `span_x`, allowing spans to start up to 10pt
/// early; otherwise the nearest column edge.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    for (i, &col_start) in columns.iter().enumerate() {
        let col_end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= col_start - 10.0 && span_x < col_end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (span_x - *a)
                .abs()
                .partial_cmp(&(span_x - *b).abs())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※"
            | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Number-style list markers: "1.", "2)", "a.", "3", "1.2.1", "第一".
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (digits, suffix) = cleaned.split_at(pos);
        if !digits.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    let mut chars = cleaned.chars();
    if let (Some(letter), Some(mark), None) = (chars.next(), chars.next(), chars.next()) {
        if letter.is_alphabetic() && (mark == '.' || mark == ')') {
            return true;
        }
    }

    // Short section numbers ("1.2", "3.1.4") but not whole sentences
    cleaned.chars().count() <= 8 && is_hierarchical_number(&cleaned)
}
