//! Core data types shared across extraction, indexing and search.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy for the extraction error log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input path does not exist
    NotFound,
    /// I/O or permission failure
    Unreadable,
    /// Corrupt container or markup; aborts the current document only
    StructuralParse,
    /// Text decoding problem (always has a fallback)
    Encoding,
    /// One page of a page-stream document failed
    PerPageFailure,
    /// One manifest item of a packaged document failed
    PerItemFailure,
    /// The index store rejected a document
    IndexStoreFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Unreadable => "unreadable",
            ErrorKind::StructuralParse => "structural parse error",
            ErrorKind::Encoding => "encoding error",
            ErrorKind::PerPageFailure => "page failure",
            ErrorKind::PerItemFailure => "item failure",
            ErrorKind::IndexStoreFailure => "index store failure",
        };
        f.write_str(name)
    }
}

/// A single non-fatal error, with the file/item/page it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub kind: ErrorKind,
    /// File, item or page identifier
    pub context: String,
    pub detail: String,
}

impl ErrorMessage {
    pub fn new(kind: ErrorKind, context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.detail)
    }
}

/// Text extracted from one document plus every error met on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub errors: Vec<ErrorMessage>,
}

#[cfg(test)]
impl ExtractionResult {
    /// Count errors of one kind
    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }
}

/// A ranked search hit with its preview snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Path relative to the library root when possible
    pub file_path: String,
    pub snippet: String,
    pub matched_terms: Vec<String>,
    pub score: f32,
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub count: usize,
    pub duration_ms: u64,
}

/// Outcome of one orchestrator run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub processed_files: usize,
    /// Files whose text reached the index store
    pub indexed_files: usize,
    pub error_count: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}
