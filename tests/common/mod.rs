//! Builds small PDF files with lopdf for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// A page under construction: text lines and gray image placements.
#[derive(Default)]
pub struct PageSpec {
    ops: Vec<Operation>,
    images: Vec<(String, u32, u32, Vec<u8>)>,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` at (x, y) in the regular font.
    pub fn text(self, text: &str, x: f32, y: f32, size: f32) -> Self {
        self.text_in("F1", text, x, y, size)
    }

    /// Show `text` at (x, y) in the bold font.
    pub fn bold(self, text: &str, x: f32, y: f32, size: f32) -> Self {
        self.text_in("F2", text, x, y, size)
    }

    fn text_in(mut self, font: &str, text: &str, x: f32, y: f32, size: f32) -> Self {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Paint a `width`×`height` 8-bit gray image into the box at (x, y).
    pub fn image(mut self, name: &str, x: f32, y: f32, width: u32, height: u32) -> Self {
        let pixels = (0..width * height).map(|i| (i * 37 % 256) as u8).collect();
        self.images.push((name.to_string(), width, height, pixels));
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width as f32),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(height as f32),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
            Operation::new("Do", vec![name.into()]),
            Operation::new("Q", vec![]),
        ]);
        self
    }
}

/// Assemble a Letter-sized document from the given pages.
pub fn build_document(pages: Vec<PageSpec>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut xobjects = lopdf::Dictionary::new();
        for (name, width, height, pixels) in page.images {
            let image = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                pixels,
            ));
            xobjects.set(name.as_bytes().to_vec(), image);
        }

        let content = Content {
            operations: page.ops,
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => regular, "F2" => bold },
                "XObject" => xobjects,
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write the document to `dir/name` and return the path.
pub fn write_pdf(dir: &Path, name: &str, pages: Vec<PageSpec>) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_document(pages);
    doc.save(&path).expect("save test pdf");
    path
}

/// One page with a large title over three body paragraphs.
pub fn title_and_paragraphs() -> PageSpec {
    PageSpec::new()
        .text("Title", 72.0, 720.0, 24.0)
        .text("para one", 72.0, 690.0, 12.0)
        .text("para two", 72.0, 660.0, 12.0)
        .text("para three", 72.0, 630.0, 12.0)
}
