// Integration tests for whole-library indexing runs

use crate::common::{create_test_services, errors_mentioning, index_library, PdfPage, TestLibrary};
use booksearch::core::indexer::CancelFlag;
use booksearch::core::types::ErrorKind;

#[test]
fn test_mixed_library_isolates_broken_page() {
    let library = TestLibrary::mixed();
    let (_index, services) = create_test_services(library.path());

    let summary = index_library(&services, library.path());

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.processed_files, 3);
    assert_eq!(summary.indexed_files, 3);
    assert!(!summary.cancelled);

    let errors = services.tracker.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert_eq!(summary.error_count, 1);
    assert_eq!(errors[0].kind, ErrorKind::PerPageFailure);
    assert!(errors[0].context.ends_with("Field Notes - Anonymous.pdf"));
    assert_eq!(errors_mentioning(&errors, "page 2").len(), 1);

    assert_eq!(services.index.doc_count().unwrap(), 3);
    assert!(!services.tracker.is_running());
    assert!(services.tracker.snapshot().is_none());
}

#[test]
fn test_bad_files_do_not_stop_the_run() {
    let mut library = TestLibrary::new();
    library.add_text("fake.epub", "not a zip");
    library.add_bytes("fake.pdf", b"plain bytes, no PDF header");
    library.add_text("good.txt", "the only readable book");

    let (_index, services) = create_test_services(library.path());
    let summary = index_library(&services, library.path());

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.processed_files, 3);
    // Unreadable books are stored with empty text
    assert_eq!(summary.indexed_files, 3);

    let errors = services.tracker.errors();
    assert_eq!(errors.len(), 2, "errors: {errors:?}");
    assert!(errors.iter().all(|e| e.kind == ErrorKind::StructuralParse));

    let response = services.search.search("readable", None, false).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.results[0].file_path, "good.txt");
}

#[test]
fn test_rerun_replaces_documents() {
    let mut library = TestLibrary::new();
    let path = library.add_text("book.txt", "first edition");
    let (_index, services) = create_test_services(library.path());

    index_library(&services, library.path());
    std::fs::write(&path, "second edition").unwrap();
    let summary = index_library(&services, library.path());

    assert_eq!(summary.indexed_files, 1);
    assert_eq!(services.index.doc_count().unwrap(), 1);

    let response = services.search.search("second", None, false).unwrap();
    assert_eq!(response.count, 1);
    let response = services.search.search("first", None, false).unwrap();
    assert_eq!(response.count, 0);
}

#[test]
fn test_emptied_book_replaces_old_text() {
    let mut library = TestLibrary::new();
    let path = library.add_text("book.txt", "first edition");
    let (_index, services) = create_test_services(library.path());

    index_library(&services, library.path());
    assert_eq!(services.search.search("first", None, false).unwrap().count, 1);

    std::fs::write(&path, "").unwrap();
    let summary = index_library(&services, library.path());

    assert_eq!(summary.indexed_files, 1);
    assert_eq!(summary.error_count, 0);
    assert_eq!(services.index.doc_count().unwrap(), 1);
    assert_eq!(services.search.search("first", None, false).unwrap().count, 0);
}

#[test]
fn test_cancel_before_start() {
    let library = TestLibrary::mixed();
    let (_index, services) = create_test_services(library.path());

    let cancel = CancelFlag::new();
    cancel.cancel();
    let summary = services
        .orchestrator()
        .unwrap()
        .with_cancel_flag(cancel)
        .run(library.path());

    assert!(summary.cancelled);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.processed_files, 0);
    assert_eq!(services.index.doc_count().unwrap(), 0);
    assert!(!services.tracker.is_running());
}

#[test]
fn test_unsupported_skipped_hidden_directories_indexed() {
    let mut library = TestLibrary::new();
    library.add_text("cover.jpg", "binary-ish");
    library.add_text(".calibre/book.txt", "kept by the library manager");
    library.add_text("partial.txt.part", "incomplete download");
    library.add_pdf("shelf/scan.pdf", &[PdfPage::Text("Shelved volume")]);

    let (_index, services) = create_test_services(library.path());
    let summary = index_library(&services, library.path());

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.indexed_files, 2);
    assert_eq!(summary.error_count, 0);

    let response = services.search.search("manager", None, false).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.results[0].file_path, ".calibre/book.txt");
}

#[test]
fn test_missing_root_is_recorded() {
    let library = TestLibrary::new();
    let missing = library.path().join("no-such-dir");
    let (_index, services) = create_test_services(library.path());

    let summary = index_library(&services, &missing);

    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.error_count, 1);
    assert!(!services.tracker.is_running());
}

#[tokio::test]
async fn test_blocking_run_polled_from_async() {
    let library = TestLibrary::mixed();
    let (_index, services) = create_test_services(library.path());
    let services = std::sync::Arc::new(services);

    let orchestrator = services.orchestrator().unwrap();
    let root = library.path().to_path_buf();
    let mut run = tokio::task::spawn_blocking(move || orchestrator.run(&root));

    let mut interval = tokio::time::interval(std::time::Duration::from_millis(1));
    let summary = loop {
        tokio::select! {
            result = &mut run => break result.unwrap(),
            _ = interval.tick() => {
                if let Some(snapshot) = services.tracker.snapshot() {
                    assert!(snapshot.processed_files <= snapshot.total_files || snapshot.total_files == 0);
                }
            }
        }
    };

    assert_eq!(summary.processed_files, 3);
    assert!(services.tracker.snapshot().is_none());
}
