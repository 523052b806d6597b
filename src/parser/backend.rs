//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the layout analysis logic.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, Stream};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, ImageColor, ImagePayload};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Letter size, used when a page carries no usable MediaBox.
pub const DEFAULT_PAGE_BOX: BoundingBox = BoundingBox {
    left: 0.0,
    bottom: 0.0,
    right: 612.0,
    top: 792.0,
};

/// Parent chain depth after which inheritance lookups give up.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Build an operation from an operator and its operands.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Operand `index` as a number.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(get_number_from_value)
    }
}

/// An image XObject resolved from a page's resources.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded or decoded sample data
    pub payload: ImagePayload,
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font info, content stream
/// decoding, text decoding and image lookup without exposing any concrete
/// PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page MediaBox in user space.
    fn page_bbox(&self, _page: PageId) -> Result<BoundingBox> {
        Ok(DEFAULT_PAGE_BOX)
    }

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// The decoded operations of a page's content stream.
    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>> {
        let data = self.page_content(page)?;
        self.decode_content(&data)
    }

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Look up the XObject `name` in the page resources.
    ///
    /// Returns `Ok(None)` when the name is missing or is not an image
    /// (e.g. a form XObject), and an error when the image exists but its
    /// data cannot be extracted.
    fn image_xobject(&self, _page: PageId, _name: &[u8]) -> Result<Option<ImageXObject>> {
        Ok(None)
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Follow a single indirect reference.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    /// Look up a page attribute, walking up the page tree for inheritable keys.
    fn inherited(&self, page: PageId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(obj) = dict.get(key) {
                return Some(self.resolve(obj));
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn stream_filters(&self, dict: &Dictionary) -> Vec<Vec<u8>> {
        match dict.get(b"Filter").map(|o| self.resolve(o)) {
            Ok(Object::Name(name)) => vec![name.clone()],
            Ok(Object::Array(items)) => items
                .iter()
                .filter_map(|o| self.resolve(o).as_name().ok().map(|n| n.to_vec()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn image_color(&self, dict: &Dictionary) -> Result<ImageColor> {
        let cs = dict
            .get(b"ColorSpace")
            .map(|o| self.resolve(o))
            .map_err(|_| Error::ImageExtract("image has no color space".to_string()))?;

        let family = match cs {
            Object::Name(name) => name.as_slice(),
            Object::Array(items) => match items.first().map(|o| self.resolve(o)) {
                Some(Object::Name(name)) => name.as_slice(),
                _ => b"".as_slice(),
            },
            _ => b"".as_slice(),
        };

        match family {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(ImageColor::Gray),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ImageColor::Rgb),
            b"DeviceCMYK" | b"CMYK" => Ok(ImageColor::Cmyk),
            b"ICCBased" => {
                let components = match cs {
                    Object::Array(items) => items
                        .get(1)
                        .and_then(|o| self.resolve_dict(o))
                        .and_then(|d| d.get(b"N").ok())
                        .and_then(|n| n.as_i64().ok()),
                    _ => None,
                };
                match components {
                    Some(1) => Ok(ImageColor::Gray),
                    Some(3) => Ok(ImageColor::Rgb),
                    Some(4) => Ok(ImageColor::Cmyk),
                    other => Err(Error::ImageExtract(format!(
                        "unsupported ICC component count {:?}",
                        other
                    ))),
                }
            }
            other => Err(Error::ImageExtract(format!(
                "unsupported color space {}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn image_payload(&self, stream: &Stream) -> Result<ImagePayload> {
        let filters = self.stream_filters(&stream.dict);
        let filter_names: Vec<&[u8]> = filters.iter().map(Vec::as_slice).collect();

        match filter_names.as_slice() {
            [b"DCTDecode"] | [b"DCT"] => {
                return Ok(ImagePayload::Jpeg {
                    data: stream.content.clone(),
                })
            }
            [] => {}
            names if names.iter().all(|n| *n == b"FlateDecode" || *n == b"Fl") => {}
            names => {
                let joined: Vec<_> = names.iter().map(|n| String::from_utf8_lossy(n)).collect();
                return Err(Error::ImageExtract(format!(
                    "unsupported image filter {}",
                    joined.join("+")
                )));
            }
        }

        if matches!(stream.dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
            return Err(Error::ImageExtract("stencil masks are not extracted".to_string()));
        }

        let color = self.image_color(&stream.dict)?;
        let bits_per_component = stream
            .dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| self.resolve(o).as_i64().ok())
            .unwrap_or(8);
        let data = if filters.is_empty() {
            stream.content.clone()
        } else {
            stream.decompressed_content()?
        };

        Ok(ImagePayload::Raw {
            color,
            bits_per_component: u8::try_from(bits_per_component).map_err(|_| {
                Error::ImageExtract(format!("invalid bits per component {}", bits_per_component))
            })?,
            data,
        })
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_bbox(&self, page: PageId) -> Result<BoundingBox> {
        let coords: Option<Vec<f32>> = match self.inherited(page, b"MediaBox") {
            Some(Object::Array(items)) => items
                .iter()
                .map(|o| object_number(self.resolve(o)))
                .collect(),
            _ => None,
        };
        match coords.as_deref() {
            Some([x0, y0, x1, y1]) => Ok(BoundingBox::new(*x0, *y0, *x1, *y1)),
            _ => {
                log::debug!("Page {:?} has no usable MediaBox, assuming Letter", page);
                Ok(DEFAULT_PAGE_BOX)
            }
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self.doc.get_page_fonts(page)?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font,
            });
        }
        Ok(result)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => self.stream_content(s),
                Object::Array(arr) => self.concat_streams(arr),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => self.concat_streams(arr),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn image_xobject(&self, page: PageId, name: &[u8]) -> Result<Option<ImageXObject>> {
        let xobjects = self
            .inherited(page, b"Resources")
            .and_then(|r| self.resolve_dict(r))
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| self.resolve_dict(x));
        let Some(xobjects) = xobjects else {
            return Ok(None);
        };

        let stream = match xobjects.get(name).map(|o| self.resolve(o)) {
            Ok(Object::Stream(stream)) => stream,
            _ => return Ok(None),
        };

        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|n| n == b"Image")
            .unwrap_or(false);
        if !is_image {
            return Ok(None);
        }

        let dimension = |key: &[u8]| -> Result<u32> {
            stream
                .dict
                .get(key)
                .ok()
                .and_then(|o| self.resolve(o).as_i64().ok())
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    Error::ImageExtract(format!(
                        "image has no valid {}",
                        String::from_utf8_lossy(key)
                    ))
                })
        };
        let width = dimension(b"Width")?;
        let height = dimension(b"Height")?;
        let payload = self.image_payload(stream)?;

        Ok(Some(ImageXObject {
            width,
            height,
            payload,
        }))
    }
}

impl LopdfBackend {
    /// Stream bytes with filters applied; unfiltered streams are returned as stored.
    fn stream_content(&self, stream: &Stream) -> Result<Vec<u8>> {
        if self.stream_filters(&stream.dict).is_empty() {
            Ok(stream.content.clone())
        } else {
            Ok(stream.decompressed_content()?)
        }
    }

    fn concat_streams(&self, parts: &[Object]) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for obj in parts {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    match self.stream_content(s) {
                        Ok(data) => {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                        Err(e) => log::warn!("Skipping unreadable content stream {:?}: {}", r, e),
                    }
                }
            }
        }
        Ok(content)
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}
