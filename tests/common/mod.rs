// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
// Note: These may appear unused in some test files but are used in others
#[allow(unused_imports)]
pub use fixtures::{EpubFixture, PdfPage, TestLibrary};
#[allow(unused_imports)]
pub use helpers::{create_test_services, errors_mentioning, index_library};
