// Test helper functions

use booksearch::core::config::Config;
use booksearch::core::services::Services;
use booksearch::core::types::{ErrorMessage, RunSummary};
use std::path::Path;
use tempfile::TempDir;

/// Create test services over `books_dir` with a temporary index
///
/// The returned `TempDir` owns the index and must outlive the services.
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services(books_dir: &Path) -> (TempDir, Services) {
    let index_dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config::default();
    config.library.books_dir = books_dir.to_path_buf();
    config.storage.index_dir = index_dir.path().join("index");

    let services = Services::new(config).expect("Failed to create services");
    (index_dir, services)
}

/// Run one indexing pass over `root`
#[allow(dead_code)] // Used in integration tests
pub fn index_library(services: &Services, root: &Path) -> RunSummary {
    services
        .orchestrator()
        .expect("Failed to create orchestrator")
        .run(root)
}

/// Errors whose context or detail contains `needle`
#[allow(dead_code)] // Used in integration tests
pub fn errors_mentioning<'a>(errors: &'a [ErrorMessage], needle: &str) -> Vec<&'a ErrorMessage> {
    errors
        .iter()
        .filter(|e| e.context.contains(needle) || e.detail.contains(needle))
        .collect()
}
