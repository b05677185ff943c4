// Integration tests for extraction over real EPUB, PDF and text files

use crate::common::{EpubFixture, PdfPage, TestLibrary};
use booksearch::core::extract::{EpubExtractor, PdfExtractor, PlainTextExtractor};
use booksearch::core::types::ErrorKind;

#[test]
fn test_epub_chapters_in_manifest_order() {
    let mut library = TestLibrary::new();
    let path = library.add_epub(
        "book.epub",
        &EpubFixture::new("Two Chapters")
            .chapter("ch1", "First chapter opening line.")
            .chapter("ch2", "Second chapter closing line."),
    );

    let result = EpubExtractor::new().extract(&path);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let first = result.text.find("First chapter").expect("first chapter missing");
    let second = result.text.find("Second chapter").expect("second chapter missing");
    assert!(first < second);
    // Head content is not visible text
    assert!(!result.text.contains("margin"));
}

#[test]
fn test_epub_missing_item_is_isolated() {
    let mut library = TestLibrary::new();
    let path = library.add_epub(
        "book.epub",
        &EpubFixture::new("Gappy")
            .chapter("ch1", "Before the gap.")
            .missing_item("ch2")
            .chapter("ch3", "After the gap."),
    );

    let result = EpubExtractor::new().extract(&path);

    assert!(result.text.contains("Before the gap."));
    assert!(result.text.contains("After the gap."));
    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    assert_eq!(result.errors[0].kind, ErrorKind::PerItemFailure);
    assert!(result.errors[0].detail.contains("ch2"));
}

#[test]
fn test_epub_windows_1252_chapter() {
    let mut library = TestLibrary::new();
    // "café" in windows-1252
    let markup = b"<html><body><p>Le caf\xe9 du coin</p></body></html>";
    let path = library.add_epub(
        "latin.epub",
        &EpubFixture::new("Latin").raw_item("ch1", "ch1.html", "text/html", markup),
    );

    let result = EpubExtractor::new().extract(&path);

    assert!(result.text.contains("Le café du coin"), "got {:?}", result.text);
    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    assert_eq!(result.errors[0].kind, ErrorKind::Encoding);
    assert!(result.errors[0].detail.contains("ch1"));
}

#[test]
fn test_epub_percent_encoded_href() {
    let mut library = TestLibrary::new();
    let markup = b"<html><body><p>Call me Ishmael.</p></body></html>";
    let path = library.add_epub(
        "spaced.epub",
        &EpubFixture::new("Spaced").stored_item(
            "ch1",
            "chapter%201.xhtml",
            "chapter 1.xhtml",
            "application/xhtml+xml",
            markup,
        ),
    );

    let result = EpubExtractor::new().extract(&path);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.text.trim(), "Call me Ishmael.");
}

#[test]
fn test_epub_skips_non_content_items() {
    let mut library = TestLibrary::new();
    let path = library.add_epub(
        "styled.epub",
        &EpubFixture::new("Styled")
            .raw_item("css", "style.css", "text/css", b"body { color: red }")
            .chapter("ch1", "Only this is text."),
    );

    let result = EpubExtractor::new().extract(&path);

    assert!(result.errors.is_empty());
    assert_eq!(result.text.trim(), "Only this is text.");
}

#[test]
fn test_epub_metadata_title() {
    let mut library = TestLibrary::new();
    let path = library.add_epub(
        "book.epub",
        &EpubFixture::new("The Real Title").chapter("ch1", "Text."),
    );

    let metadata = EpubExtractor::new().metadata(&path).unwrap();
    assert_eq!(metadata.title.as_deref(), Some("The Real Title"));
}

#[test]
fn test_epub_not_a_zip() {
    let mut library = TestLibrary::new();
    let path = library.add_text("fake.epub", "this is not an archive");

    let result = EpubExtractor::new().extract(&path);

    assert!(result.text.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ErrorKind::StructuralParse);
}

#[test]
fn test_pdf_broken_page_is_isolated() {
    let mut library = TestLibrary::new();
    let path = library.add_pdf(
        "report.pdf",
        &[
            PdfPage::Text("Opening summary"),
            PdfPage::Broken,
            PdfPage::Text("Closing remarks"),
        ],
    );

    let result = PdfExtractor::new().extract(&path);

    assert!(result.text.contains("Opening summary"), "got {:?}", result.text);
    assert!(result.text.contains("Closing remarks"), "got {:?}", result.text);
    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    assert_eq!(result.errors[0].kind, ErrorKind::PerPageFailure);
    assert!(result.errors[0].detail.starts_with("page 2/3"));
}

#[test]
fn test_pdf_pages_in_order() {
    let mut library = TestLibrary::new();
    let path = library.add_pdf(
        "ordered.pdf",
        &[PdfPage::Text("Alpha"), PdfPage::Text("Bravo"), PdfPage::Text("Charlie")],
    );

    let result = PdfExtractor::new().extract(&path);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let alpha = result.text.find("Alpha").unwrap();
    let bravo = result.text.find("Bravo").unwrap();
    let charlie = result.text.find("Charlie").unwrap();
    assert!(alpha < bravo && bravo < charlie);
}

#[test]
fn test_missing_files_are_not_found() {
    let library = TestLibrary::new();

    for result in [
        EpubExtractor::new().extract(&library.path().join("gone.epub")),
        PdfExtractor::new().extract(&library.path().join("gone.pdf")),
        PlainTextExtractor::new().extract(&library.path().join("gone.txt")),
    ] {
        assert!(result.text.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::NotFound);
    }
}

#[test]
fn test_text_drops_invalid_bytes() {
    let mut library = TestLibrary::new();
    let path = library.add_bytes("mixed.txt", b"valid \xff\xfe text \xf0\x9f\xa6\x80");

    let result = PlainTextExtractor::new().extract(&path);

    assert!(result.errors.is_empty());
    assert_eq!(result.text, "valid  text 🦀");
}
