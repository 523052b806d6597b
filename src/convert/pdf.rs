//! PDF document converter implementation.

use crate::error::{CallbackError, Result};
use crate::fonts::{FontAnalyzer, HeadingLevelMap};
use crate::model::{sort_reading_order, ContentBlock, Page, PageImage};
use crate::parser::{
    clip_spans, interpret_page, normalize_spans, LayoutAnalyzer, PageContent, PageId, PdfBackend,
    TableDetector,
};
use crate::progress::{ProcessPhase, ProgressInfo, ProgressReporter};
use crate::render::{ConvertResult, ImageStore, MarkdownRenderer};

use super::{ConvertOptions, ErrorMode};

/// A laid-out page plus the images that could not be read.
struct BuiltPage {
    page: Page,
    skipped_images: u32,
}

/// Converts the pages of a [`PdfBackend`] to Markdown.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    options: ConvertOptions,
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run both phases and render Markdown, saving images as they are met.
    ///
    /// The image directory is created once analysis has finished.
    pub fn convert<B, F>(&self, backend: &B, callback: F) -> Result<ConvertResult>
    where
        B: PdfBackend + ?Sized,
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        let pages = backend.pages();
        let mut reporter = ProgressReporter::new(callback, pages.len() as u32);
        let headings = self.analyze(backend, &mut reporter)?;

        let mut store = if self.options.extract_images {
            Some(ImageStore::create(&self.options.image_dir)?)
        } else {
            None
        };
        let mut renderer = MarkdownRenderer::new(self.options.render.clone());
        if let Some(store) = store.as_mut() {
            renderer = renderer.with_image_store(store);
        }

        for (index, (&number, &id)) in pages.iter().enumerate() {
            match self.build_page(backend, number, id, &headings) {
                Ok(built) => {
                    renderer.render_page(&built.page);
                    for _ in 0..built.skipped_images {
                        renderer.skip_image();
                    }
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", number, e);
                    renderer.skip_page();
                }
                Err(e) => return Err(e),
            }
            reporter.page_done(
                ProcessPhase::Conversion,
                index as u32 + 1,
                format!("Converted page {}", number),
            )?;
        }

        let (markdown, stats) = renderer.finish();
        log::info!(
            "Converted {} pages: {} headings, {} paragraphs, {} tables, {} images",
            stats.pages,
            stats.headings,
            stats.paragraphs,
            stats.tables,
            stats.images
        );

        Ok(ConvertResult {
            markdown,
            headings,
            stats,
        })
    }

    /// Run both phases and return the laid-out pages without writing images.
    pub fn extract_pages<B, F>(&self, backend: &B, callback: F) -> Result<Vec<Page>>
    where
        B: PdfBackend + ?Sized,
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        let pages = backend.pages();
        let mut reporter = ProgressReporter::new(callback, pages.len() as u32);
        let headings = self.analyze(backend, &mut reporter)?;

        let mut out = Vec::with_capacity(pages.len());
        for (index, (&number, &id)) in pages.iter().enumerate() {
            match self.build_page(backend, number, id, &headings) {
                Ok(built) => out.push(built.page),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", number, e);
                }
                Err(e) => return Err(e),
            }
            reporter.page_done(
                ProcessPhase::Conversion,
                index as u32 + 1,
                format!("Extracted page {}", number),
            )?;
        }
        Ok(out)
    }

    /// Analysis phase only: scan every page's spans into a heading map.
    pub fn analyze_fonts<B, F>(&self, backend: &B, callback: F) -> Result<HeadingLevelMap>
    where
        B: PdfBackend + ?Sized,
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        let mut reporter = ProgressReporter::new(callback, backend.pages().len() as u32);
        self.analyze(backend, &mut reporter)
    }

    fn analyze<B, F>(&self, backend: &B, reporter: &mut ProgressReporter<F>) -> Result<HeadingLevelMap>
    where
        B: PdfBackend + ?Sized,
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        let mut analyzer =
            FontAnalyzer::new(self.options.max_heading_levels, self.options.min_heading_delta);

        for (index, (&number, &id)) in backend.pages().iter().enumerate() {
            let page = backend
                .page_bbox(id)
                .and_then(|page_box| Ok((page_box, self.read_page(backend, number, id)?)));
            match page {
                Ok((page_box, content)) => {
                    analyzer.observe(&clip_spans(normalize_spans(content.spans), &page_box))
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("No font samples from page {}: {}", number, e);
                }
                Err(e) => return Err(e),
            }
            reporter.page_done(
                ProcessPhase::Analysis,
                index as u32 + 1,
                format!("Analyzed fonts on page {}", number),
            )?;
        }

        Ok(analyzer.finish())
    }

    fn read_page<B: PdfBackend + ?Sized>(
        &self,
        backend: &B,
        number: u32,
        id: PageId,
    ) -> Result<PageContent> {
        let content = interpret_page(backend, id)?;
        log::debug!(
            "Page {}: {} spans, {} image placements",
            number,
            content.spans.len(),
            content.images.len()
        );
        Ok(content)
    }

    /// Lay out one page: tables first, then text blocks, then images, all
    /// sorted into reading order.
    fn build_page<B: PdfBackend + ?Sized>(
        &self,
        backend: &B,
        number: u32,
        id: PageId,
        headings: &HeadingLevelMap,
    ) -> Result<BuiltPage> {
        let page_box = backend.page_bbox(id)?;
        let content = self.read_page(backend, number, id)?;
        let mut blocks = Vec::new();

        let mut spans = clip_spans(normalize_spans(content.spans), &page_box);
        if self.options.detect_tables {
            let detector = TableDetector::with_config(self.options.table.clone());
            let (tables, rest) = detector.detect_within(spans, Some(&page_box));
            for detected in tables {
                blocks.push(ContentBlock::Table {
                    table: detected.table,
                    bbox: detected.bbox,
                });
            }
            spans = rest;
        }

        blocks.extend(
            LayoutAnalyzer::new(headings)
                .with_bold_emphasis(self.options.render.bold_emphasis)
                .analyze(spans),
        );

        let mut skipped_images = 0;
        if self.options.extract_images {
            let mut sequence = 0;
            for placement in &content.images {
                match backend.image_xobject(id, &placement.name) {
                    Ok(Some(xobject)) => {
                        sequence += 1;
                        blocks.push(ContentBlock::Image {
                            image: PageImage {
                                page: number,
                                sequence,
                                width: xobject.width,
                                height: xobject.height,
                                payload: xobject.payload,
                            },
                            bbox: placement.bbox,
                        });
                    }
                    Ok(None) => {
                        log::debug!(
                            "XObject {} on page {} is not an image",
                            String::from_utf8_lossy(&placement.name),
                            number
                        );
                    }
                    Err(e) => {
                        sequence += 1;
                        skipped_images += 1;
                        log::warn!(
                            "Skipping image {} on page {}: {}",
                            String::from_utf8_lossy(&placement.name),
                            number,
                            e
                        );
                    }
                }
            }
        }

        sort_reading_order(&mut blocks);

        let mut page = Page::new(number, page_box.width(), page_box.height());
        for block in blocks {
            page.add_block(block);
        }
        Ok(BuiltPage {
            page,
            skipped_images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{ImageColor, ImagePayload};
    use crate::parser::{BackendFontInfo, ContentOp, ImageXObject, PdfValue};
    use crate::progress::ignore_progress;
    use std::collections::BTreeMap;

    /// Pages given as lists of (text, x, y, size); `None` pages fail to decode.
    struct ScriptedBackend {
        pages: Vec<Option<Vec<ContentOp>>>,
        image: Option<ImageXObject>,
    }

    impl ScriptedBackend {
        fn new(pages: Vec<Option<Vec<(&str, f32, f32, f32)>>>) -> Self {
            let pages = pages
                .into_iter()
                .map(|page| page.map(|lines| lines.into_iter().flat_map(text_ops).collect()))
                .collect();
            Self { pages, image: None }
        }
    }

    fn text_ops((text, x, y, size): (&str, f32, f32, f32)) -> Vec<ContentOp> {
        vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Real(size)]),
            ContentOp::new("Td", vec![PdfValue::Real(x), PdfValue::Real(y)]),
            ContentOp::new("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())]),
            ContentOp::new("ET", vec![]),
        ]
    }

    impl PdfBackend for ScriptedBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.pages.len() as u32).map(|n| (n, (n, 0))).collect()
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![BackendFontInfo {
                name: b"F1".to_vec(),
                base_font: "Helvetica".to_string(),
            }])
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(Vec::new())
        }

        fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>> {
            self.pages[page.0 as usize - 1]
                .clone()
                .ok_or_else(|| Error::PdfParse(format!("page {} is corrupt", page.0)))
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }

        fn image_xobject(&self, _page: PageId, name: &[u8]) -> Result<Option<ImageXObject>> {
            match name {
                b"Im1" => Ok(self.image.clone()),
                b"Bad" => Err(Error::ImageExtract("unsupported filter".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn no_images() -> ConvertOptions {
        ConvertOptions::new().with_images(false)
    }

    #[test]
    fn test_title_and_paragraphs() {
        let backend = ScriptedBackend::new(vec![Some(vec![
            ("Title", 72.0, 720.0, 24.0),
            ("para one", 72.0, 690.0, 12.0),
            ("para two", 72.0, 660.0, 12.0),
            ("para three", 72.0, 630.0, 12.0),
        ])]);

        let result = PdfConverter::new(no_images())
            .convert(&backend, ignore_progress)
            .unwrap();
        assert_eq!(
            result.markdown,
            "# Title\n\npara one\n\npara two\n\npara three\n"
        );
        assert_eq!(result.stats.headings, 1);
        assert_eq!(result.stats.paragraphs, 3);
        assert_eq!(result.headings.level_for(24.0), Some(1));
    }

    #[test]
    fn test_uniform_size_has_no_headings() {
        let backend = ScriptedBackend::new(vec![Some(vec![
            ("Looks like a title", 72.0, 720.0, 11.0),
            ("but every line is the same size.", 72.0, 690.0, 11.0),
        ])]);
        let result = PdfConverter::new(no_images())
            .convert(&backend, ignore_progress)
            .unwrap();
        assert!(!result.markdown.contains('#'));
        assert_eq!(result.stats.headings, 0);
    }

    #[test]
    fn test_lenient_skips_broken_page() {
        let backend = ScriptedBackend::new(vec![
            Some(vec![("first page", 72.0, 720.0, 12.0)]),
            None,
            Some(vec![("third page", 72.0, 720.0, 12.0)]),
        ]);

        let result = PdfConverter::new(no_images())
            .convert(&backend, ignore_progress)
            .unwrap();
        assert_eq!(result.markdown, "first page\n\nthird page\n");
        assert_eq!(result.stats.pages, 2);
        assert_eq!(result.stats.skipped_pages, 1);
    }

    #[test]
    fn test_strict_fails_on_broken_page() {
        let backend = ScriptedBackend::new(vec![Some(vec![("ok", 72.0, 720.0, 12.0)]), None]);
        let err = PdfConverter::new(no_images().strict())
            .convert(&backend, ignore_progress)
            .unwrap_err();
        assert!(matches!(err, Error::PdfParse(_)));
    }

    #[test]
    fn test_image_sequence_and_failures() {
        let mut ops = text_ops(("caption", 72.0, 100.0, 12.0));
        for name in ["Form", "Bad", "Im1"] {
            ops.push(ContentOp::new("q", vec![]));
            ops.push(ContentOp::new(
                "cm",
                [100.0, 0.0, 0.0, 100.0, 72.0, 500.0]
                    .into_iter()
                    .map(PdfValue::Real)
                    .collect(),
            ));
            ops.push(ContentOp::new("Do", vec![PdfValue::Name(name.as_bytes().to_vec())]));
            ops.push(ContentOp::new("Q", vec![]));
        }
        let backend = ScriptedBackend {
            pages: vec![Some(ops)],
            image: Some(ImageXObject {
                width: 1,
                height: 1,
                payload: ImagePayload::Raw {
                    color: ImageColor::Gray,
                    bits_per_component: 8,
                    data: vec![200],
                },
            }),
        };

        let converter = PdfConverter::new(ConvertOptions::new());
        let built = converter
            .build_page(&backend, 1, (1, 0), &HeadingLevelMap::default())
            .unwrap();
        assert_eq!(built.skipped_images, 1);

        let images: Vec<&PageImage> = built
            .page
            .blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Image { image, .. } => Some(image),
                _ => None,
            })
            .collect();
        assert_eq!(images.len(), 1);
        // "Form" takes no number, "Bad" takes the first
        assert_eq!(images[0].sequence, 2);
        assert_eq!(images[0].suggested_filename(), "page1_img2.png");

        // Image sits above the caption
        assert!(built.page.blocks[0].kind() == "image");
    }

    #[test]
    fn test_progress_events() {
        let backend = ScriptedBackend::new(vec![
            Some(vec![("one", 72.0, 720.0, 12.0)]),
            Some(vec![("two", 72.0, 720.0, 12.0)]),
            Some(vec![("three", 72.0, 720.0, 12.0)]),
        ]);
        let mut events = Vec::new();
        PdfConverter::new(no_images())
            .convert(&backend, |info: &ProgressInfo| -> std::result::Result<(), CallbackError> {
                events.push(info.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(events.len(), 6);
        assert!(events[..3].iter().all(|e| e.phase == ProcessPhase::Analysis));
        assert!(events[3..].iter().all(|e| e.phase == ProcessPhase::Conversion));
        assert!(events.windows(2).all(|w| w[0].percentage <= w[1].percentage));
        assert_eq!(events[2].phase_percentage, 100.0);
        assert_eq!(events[5].percentage, 100.0);
        assert_eq!(events[5].current_page, 3);
    }

    #[test]
    fn test_callback_error_aborts() {
        let backend = ScriptedBackend::new(vec![
            Some(vec![("one", 72.0, 720.0, 12.0)]),
            Some(vec![("two", 72.0, 720.0, 12.0)]),
        ]);
        let mut calls = 0;
        let err = PdfConverter::new(no_images())
            .convert(&backend, |_: &ProgressInfo| -> std::result::Result<(), CallbackError> {
                calls += 1;
                if calls == 2 {
                    Err("cancelled".into())
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_extract_pages() {
        let backend = ScriptedBackend::new(vec![Some(vec![
            ("Heading", 72.0, 720.0, 18.0),
            ("body text", 72.0, 690.0, 10.0),
            ("more body text", 72.0, 660.0, 10.0),
        ])]);
        let pages = PdfConverter::new(no_images())
            .extract_pages(&backend, ignore_progress)
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].heading_count(), 1);
        assert_eq!(pages[0].width, 612.0);
    }
}
