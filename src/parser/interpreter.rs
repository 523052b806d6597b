//! Content stream interpretation.
//!
//! Walks a page's decoded operations, tracking the graphics state
//! (`q`/`Q`/`cm`) and text state (`BT`/`Tf`/`Td`/`Tm`/...) to produce
//! positioned text spans and image placements.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::BoundingBox;

use super::backend::{get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue};
use super::layout::TextSpan;
use super::text::is_spaceless_script_char;

/// Estimated glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

const DEFAULT_FONT_SIZE: f32 = 12.0;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Guard against unbalanced `q` operators in broken streams.
const MAX_STATE_DEPTH: usize = 64;

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn x_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn y_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    fn from_operands(op: &ContentOp) -> Option<Matrix> {
        if op.operands.len() < 6 {
            return None;
        }
        Some(Matrix::new(
            op.number(0)?,
            op.number(1)?,
            op.number(2)?,
            op.number(3)?,
            op.number(4)?,
            op.number(5)?,
        ))
    }

    /// Image of the unit square, which is where `Do` paints an image.
    fn unit_square_bbox(&self) -> BoundingBox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        let (mut left, mut bottom) = corners[0];
        let (mut right, mut top) = corners[0];
        for (x, y) in &corners[1..] {
            left = left.min(*x);
            right = right.max(*x);
            bottom = bottom.min(*y);
            top = top.max(*y);
        }
        BoundingBox::new(left, bottom, right, top)
    }
}

/// An XObject painted on the page with `Do`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Resource name of the XObject
    pub name: Vec<u8>,
    /// Area covered on the page
    pub bbox: BoundingBox,
}

/// Everything interpretation yields for one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub spans: Vec<TextSpan>,
    pub images: Vec<ImagePlacement>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            leading: 0.0,
        }
    }
}

/// Interpret a page's content stream.
pub fn interpret_page<B: PdfBackend + ?Sized>(backend: &B, page: PageId) -> Result<PageContent> {
    let fonts: HashMap<Vec<u8>, String> = match backend.page_fonts(page) {
        Ok(fonts) => fonts.into_iter().map(|f| (f.name, f.base_font)).collect(),
        Err(e) => {
            log::debug!("No font resources for page {:?}: {}", page, e);
            HashMap::new()
        }
    };
    let ops = backend.page_operations(page)?;

    let mut interpreter = ContentInterpreter::new(backend, page, &fonts);
    interpreter.run(&ops);
    Ok(interpreter.finish())
}

/// State machine over one page's operations.
pub struct ContentInterpreter<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    page: PageId,
    fonts: &'a HashMap<Vec<u8>, String>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text: bool,
    content: PageContent,
}

impl<'a, B: PdfBackend + ?Sized> ContentInterpreter<'a, B> {
    pub fn new(backend: &'a B, page: PageId, fonts: &'a HashMap<Vec<u8>, String>) -> Self {
        Self {
            backend,
            page,
            fonts,
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text: false,
            content: PageContent::default(),
        }
    }

    /// Process a sequence of operations.
    pub fn run(&mut self, ops: &[ContentOp]) {
        for op in ops {
            self.apply(op);
        }
    }

    pub fn finish(self) -> PageContent {
        self.content
    }

    fn apply(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            "q" => {
                if self.saved.len() < MAX_STATE_DEPTH {
                    self.saved.push(self.state.clone());
                }
            }
            "Q" => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(op) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.state.font_name = self
                        .fonts
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                    self.state.font_resource = name.clone();
                }
                if let Some(size) = op.number(1) {
                    self.state.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    self.state.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(op) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(value) = op.operands.first() {
                    self.show(std::slice::from_ref(value));
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(value) = op.operands.first() {
                    self.show(std::slice::from_ref(value));
                }
            }
            "\"" => {
                self.next_line();
                if let Some(value) = op.operands.get(2) {
                    self.show(std::slice::from_ref(value));
                }
            }
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.content.images.push(ImagePlacement {
                        name: name.clone(),
                        bbox: self.state.ctm.unit_square_bbox(),
                    });
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.state.leading != 0.0 {
            self.state.leading
        } else {
            // Streams relying on the zero default still expect lines to advance.
            self.state.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    /// Show strings (and TJ positioning adjustments), emitting one span.
    fn show(&mut self, items: &[PdfValue]) {
        if !self.in_text {
            return;
        }

        let size = self.state.font_size;
        let mut text = String::new();
        let mut advance = 0.0f32;

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let decoded =
                        self.backend
                            .decode_text(self.page, &self.state.font_resource, bytes);
                    advance += decoded.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
                    text.push_str(&decoded);
                }
                other => {
                    let Some(adjustment) = get_number_from_value(other) else {
                        continue;
                    };
                    advance -= adjustment * size / 1000.0;
                    let gap = -adjustment;
                    let needs_space = gap > TJ_SPACE_THRESHOLD
                        && text
                            .chars()
                            .last()
                            .map(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                            .unwrap_or(false);
                    if needs_space {
                        text.push(' ');
                    }
                }
            }
        }

        let rendering = self.text_matrix.multiply(&self.state.ctm);
        if !text.trim().is_empty() {
            let (x, y) = rendering.apply(0.0, 0.0);
            let effective_size = size * rendering.y_scale();
            let width = advance.max(0.0) * rendering.x_scale();
            self.content.spans.push(
                TextSpan::new(text, x, y, effective_size, self.state.font_name.clone())
                    .with_width(width),
            );
        }

        self.text_matrix = Matrix::translation(advance, 0.0).multiply(&self.text_matrix);
    }
}
