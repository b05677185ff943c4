//! Error types and error handling for booksearch.
//!
//! `BookSearchError` is returned by operations that can fail as a
//! whole (configuration, index store, search). Extraction never
//! returns it to callers: per-document failures are reported as
//! [`ErrorMessage`](crate::core::types::ErrorMessage) values instead.

use thiserror::Error;

use crate::core::types::ErrorKind;

/// Result type alias for booksearch operations
pub type Result<T> = std::result::Result<T, BookSearchError>;

/// Main error type for booksearch
#[derive(Error, Debug)]
pub enum BookSearchError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File exceeds the size limit: {size} bytes > {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Corrupt document structure: {0}")]
    StructuralParse(String),

    #[error("Text decoding failed: {0}")]
    Encoding(String),

    #[error("page {page}/{total}: {message}")]
    PageText {
        page: usize,
        total: usize,
        message: String,
    },

    #[error("item {item}: {message}")]
    ItemFailed { item: String, message: String },

    #[error("Index store failure: {0}")]
    IndexStore(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl BookSearchError {
    /// Classify the error for the extraction error log
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookSearchError::NotFound(_) | BookSearchError::InvalidPath(_) => ErrorKind::NotFound,
            BookSearchError::Unreadable { .. }
            | BookSearchError::TooLarge { .. }
            | BookSearchError::IoError(_) => ErrorKind::Unreadable,
            BookSearchError::StructuralParse(_) => ErrorKind::StructuralParse,
            BookSearchError::Encoding(_) => ErrorKind::Encoding,
            BookSearchError::PageText { .. } => ErrorKind::PerPageFailure,
            BookSearchError::ItemFailed { .. } => ErrorKind::PerItemFailure,
            BookSearchError::IndexStore(_)
            | BookSearchError::SearchFailed(_)
            | BookSearchError::InvalidQuery(_)
            | BookSearchError::ConfigError(_)
            | BookSearchError::SerdeError(_)
            | BookSearchError::TomlError(_) => ErrorKind::IndexStoreFailure,
        }
    }
}
