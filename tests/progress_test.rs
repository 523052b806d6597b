//! Progress reporting over real files.

mod common;

use common::{title_and_paragraphs, write_pdf, PageSpec};
use pdf4llm::{CallbackError, ConvertOptions, Error, ProcessPhase, ProgressInfo};
use tempfile::tempdir;

fn three_pages(dir: &std::path::Path) -> std::path::PathBuf {
    write_pdf(
        dir,
        "three.pdf",
        vec![
            title_and_paragraphs(),
            PageSpec::new().text("page two", 72.0, 720.0, 12.0),
            PageSpec::new().text("page three", 72.0, 720.0, 12.0),
        ],
    )
}

#[test]
fn test_progress_covers_both_phases() {
    let dir = tempdir().unwrap();
    let path = three_pages(dir.path());
    let options = ConvertOptions::new().with_images(false);

    let mut events: Vec<ProgressInfo> = Vec::new();
    let markdown = pdf4llm::to_markdown_with_progress(
        &path,
        &options,
        |info: &ProgressInfo| -> Result<(), CallbackError> {
            events.push(info.clone());
            Ok(())
        },
    )
    .unwrap();
    assert!(markdown.ends_with("page three\n"));

    assert_eq!(events.len(), 6);
    let phases: Vec<ProcessPhase> = events.iter().map(|e| e.phase).collect();
    assert_eq!(
        phases,
        vec![
            ProcessPhase::Analysis,
            ProcessPhase::Analysis,
            ProcessPhase::Analysis,
            ProcessPhase::Conversion,
            ProcessPhase::Conversion,
            ProcessPhase::Conversion,
        ]
    );

    let pages: Vec<u32> = events.iter().map(|e| e.current_page).collect();
    assert_eq!(pages, vec![1, 2, 3, 1, 2, 3]);
    assert!(events.iter().all(|e| e.total_pages == 3));
    assert!(events.windows(2).all(|w| w[0].percentage <= w[1].percentage));
    assert_eq!(events[2].percentage, 70.0);
    assert_eq!(events[5].percentage, 100.0);
}

#[test]
fn test_callback_error_stops_conversion() {
    let dir = tempdir().unwrap();
    let path = three_pages(dir.path());
    let image_dir = dir.path().join("images");
    let options = ConvertOptions::new().with_image_dir(&image_dir);

    let mut calls = 0;
    let err = pdf4llm::convert_file(&path, &options, |info: &ProgressInfo| -> Result<(), CallbackError> {
        calls += 1;
        if info.phase == ProcessPhase::Analysis && info.current_page == 2 {
            Err("user cancelled".into())
        } else {
            Ok(())
        }
    })
    .unwrap_err();

    assert!(matches!(err, Error::Callback(_)));
    assert!(err.to_string().contains("user cancelled"));
    assert_eq!(calls, 2);
    // Aborted before the conversion phase opened the image directory
    assert!(!image_dir.exists());
}

#[test]
fn test_font_analysis_reports_only_analysis() {
    let dir = tempdir().unwrap();
    let path = three_pages(dir.path());

    let backend = pdf4llm::LopdfBackend::load_file(&path).unwrap();
    let converter = pdf4llm::PdfConverter::new(ConvertOptions::default());

    let mut last = None;
    let map = converter
        .analyze_fonts(&backend, |info: &ProgressInfo| -> Result<(), CallbackError> {
            assert_eq!(info.phase, ProcessPhase::Analysis);
            last = Some(info.clone());
            Ok(())
        })
        .unwrap();

    assert_eq!(map.level_for(24.0), Some(1));
    let last = last.unwrap();
    assert_eq!(last.current_page, 3);
    assert_eq!(last.phase_percentage, 100.0);
    assert_eq!(last.percentage, 70.0);
}
