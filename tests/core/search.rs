// Integration tests for search over an indexed library

use crate::common::{create_test_services, index_library, TestLibrary};
use booksearch::core::search::NO_SNIPPET;
use booksearch::core::snippet::highlight_terms;

#[test]
fn test_search_epub_phrase() {
    let library = TestLibrary::mixed();
    let (_index, services) = create_test_services(library.path());
    index_library(&services, library.path());

    let response = services
        .search
        .search("\"white whale\"", None, false)
        .expect("Search failed");

    assert_eq!(response.count, 1);
    let hit = &response.results[0];
    assert_eq!(hit.file_path, "Moby Dick - Herman Melville.epub");
    assert!(hit.snippet.contains("white whale"), "snippet: {:?}", hit.snippet);
    assert_eq!(hit.matched_terms, vec!["white whale"]);
    assert!(hit.score > 0.0);
}

#[test]
fn test_search_pdf_pages_around_broken_one() {
    let library = TestLibrary::mixed();
    let (_index, services) = create_test_services(library.path());
    index_library(&services, library.path());

    for query in ["lighthouse", "barometer"] {
        let response = services.search.search(query, None, false).unwrap();
        assert_eq!(response.count, 1, "query {query}");
        assert_eq!(response.results[0].file_path, "Field Notes - Anonymous.pdf");
    }

    let response = services.search.search("unreachable", None, false).unwrap();
    assert_eq!(response.count, 0);
}

#[test]
fn test_search_boolean_across_formats() {
    let library = TestLibrary::mixed();
    let (_index, services) = create_test_services(library.path());
    index_library(&services, library.path());

    let response = services.search.search("harpoons OR ahab", Some(10), false).unwrap();
    assert_eq!(response.count, 2);

    let mut files: Vec<&str> = response.results.iter().map(|h| h.file_path.as_str()).collect();
    files.sort_unstable();
    assert_eq!(files, vec!["Moby Dick - Herman Melville.epub", "notes.txt"]);
    assert!(response.results.iter().all(|h| h.snippet != NO_SNIPPET));
}

#[test]
fn test_literal_search_ignores_syntax() {
    let mut library = TestLibrary::new();
    library.add_text("syntax.txt", "brackets [like these] and carets ^ appear");
    let (_index, services) = create_test_services(library.path());
    index_library(&services, library.path());

    let response = services.search.search("[like these]", None, true).unwrap();
    assert_eq!(response.count, 1);
}

#[test]
fn test_title_punctuation_in_query() {
    let mut library = TestLibrary::new();
    library.add_text("dune.txt", "Dune Messiah follows the emperor");
    let (_index, services) = create_test_services(library.path());
    index_library(&services, library.path());

    for query in ["Dune: Messiah", "emperor^", "[Messiah]", "follows (the"] {
        let response = services.search.search(query, None, false).unwrap();
        assert_eq!(response.count, 1, "query {query:?}");
    }
}

#[test]
fn test_snippet_highlighting() {
    let mut library = TestLibrary::new();
    library.add_text("sea.txt", "The Whale rose. Then the whale dove.");
    let (_index, services) = create_test_services(library.path());
    index_library(&services, library.path());

    let response = services.search.search("whale", None, false).unwrap();
    let hit = &response.results[0];
    let highlighted = highlight_terms(&hit.snippet, &hit.matched_terms, "<", ">");

    assert!(highlighted.contains("<Whale>"));
    assert!(highlighted.contains("<whale>"));
}

#[test]
fn test_search_empty_index() {
    let library = TestLibrary::new();
    let (_index, services) = create_test_services(library.path());

    let response = services.search.search("anything", None, false).unwrap();
    assert_eq!(response.count, 0);
    assert!(response.results.is_empty());
}
