//! Document text extraction.
//!
//! Every extractor turns a path into an [`ExtractionResult`] and never
//! fails as a whole: a missing file, a corrupt container or a single
//! bad page all end up as [`ErrorMessage`] entries next to whatever
//! text could still be recovered.
//!
//! - **epub**: zip+XML packages (manifest, spine, XHTML items)
//! - **pdf**: page-stream documents, one page at a time
//! - **text**: plain UTF-8 files, invalid bytes dropped
//! - **html**: visible-text extraction shared by the EPUB extractor

pub mod epub;
pub mod html;
pub mod pdf;
pub mod text;

use std::path::Path;
use std::sync::Arc;

use crate::core::error::BookSearchError;
use crate::core::types::{ErrorKind, ErrorMessage, ExtractionResult};

pub use epub::EpubExtractor;
pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

/// Document formats, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Epub,
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the kind from a path suffix (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "epub" => Some(Self::Epub),
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epub => "epub",
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }
}

/// Extracts plain text from one document format
pub trait TextExtractor: Send + Sync {
    /// Extract the document at `path`. Never panics on bad input.
    fn extract(&self, path: &Path) -> ExtractionResult;

    /// Extractor name for logging
    fn name(&self) -> &'static str;
}

/// Extractors for every supported [`DocumentKind`]
#[derive(Clone)]
pub struct ExtractorSet {
    epub: Arc<dyn TextExtractor>,
    pdf: Arc<dyn TextExtractor>,
    text: Arc<dyn TextExtractor>,
}

impl ExtractorSet {
    pub fn new(
        epub: Arc<dyn TextExtractor>,
        pdf: Arc<dyn TextExtractor>,
        text: Arc<dyn TextExtractor>,
    ) -> Self {
        Self { epub, pdf, text }
    }

    /// Extractor for a document kind
    pub fn get(&self, kind: DocumentKind) -> &dyn TextExtractor {
        match kind {
            DocumentKind::Epub => self.epub.as_ref(),
            DocumentKind::Pdf => self.pdf.as_ref(),
            DocumentKind::Text => self.text.as_ref(),
        }
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new(
            Arc::new(EpubExtractor::new()),
            Arc::new(PdfExtractor::new()),
            Arc::new(PlainTextExtractor::new()),
        )
    }
}

/// Collects non-fatal errors for one document while extraction keeps going.
///
/// Each recorded error is also logged at `warn` level.
#[derive(Debug)]
pub struct ErrorSink {
    context: String,
    errors: Vec<ErrorMessage>,
}

impl ErrorSink {
    /// Create a sink whose messages are attributed to `context`
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            errors: Vec::new(),
        }
    }

    /// Sink for a document path
    pub fn for_path(path: &Path) -> Self {
        Self::new(path.display().to_string())
    }

    /// Record an error of the given kind
    pub fn record(&mut self, kind: ErrorKind, detail: impl Into<String>) {
        let message = ErrorMessage::new(kind, self.context.clone(), detail);
        tracing::warn!("{} ({}): {}", message.context, kind, message.detail);
        self.errors.push(message);
    }

    /// Record a typed error, classified by [`BookSearchError::kind`]
    pub fn record_error(&mut self, error: &BookSearchError) {
        self.record(error.kind(), error.to_string());
    }

    /// Close the sink, pairing its errors with the recovered text
    pub fn finish(self, text: String) -> ExtractionResult {
        ExtractionResult {
            text,
            errors: self.errors,
        }
    }

    /// Record `error` and close the sink with empty text
    pub fn abort(mut self, error: &BookSearchError) -> ExtractionResult {
        self.record_error(error);
        self.finish(String::new())
    }
}

/// Missing-file check shared by the extractors
pub(crate) fn ensure_exists(path: &Path) -> Result<(), BookSearchError> {
    if path.exists() {
        Ok(())
    } else {
        Err(BookSearchError::NotFound(path.display().to_string()))
    }
}
