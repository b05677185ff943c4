//! PDF text extraction, one page at a time.
//!
//! A page that fails (parser error or panic) is reported as
//! `page {n}/{total}: {detail}` and skipped; the remaining pages are
//! still extracted.

use std::fs::File;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;

use crate::core::error::BookSearchError;
use crate::core::extract::{ensure_exists, ErrorSink, TextExtractor};
use crate::core::types::ExtractionResult;

/// Page-level access to a paged document
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the 1-based page `page`
    fn page_text(&self, page: usize) -> Result<String, String>;
}

/// [`PageSource`] over a parsed lopdf document
pub struct LopdfPages {
    doc: Document,
    /// Page numbers as stored in the page tree, in order
    pages: Vec<u32>,
}

impl LopdfPages {
    pub fn new(doc: Document) -> Self {
        let pages = doc.get_pages().into_keys().collect();
        Self { doc, pages }
    }

    pub fn load(path: &Path) -> Result<Self, BookSearchError> {
        let loaded = panic::catch_unwind(|| Document::load(path)).map_err(|_| {
            BookSearchError::StructuralParse("PDF parser panicked while loading".to_string())
        })?;
        let doc = loaded
            .map_err(|e| BookSearchError::StructuralParse(format!("not a valid PDF: {e}")))?;
        if doc.is_encrypted() {
            tracing::debug!("{:?} is encrypted, page text may be unavailable", path);
        }
        Ok(Self::new(doc))
    }
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String, String> {
        let number = page
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or_else(|| format!("no such page {page}"))?;
        self.doc.extract_text(&[*number]).map_err(|e| e.to_string())
    }
}

/// PDF text extractor
#[derive(Debug, Default, Clone)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, path: &Path) -> ExtractionResult {
        let sink = ErrorSink::for_path(path);

        if let Err(e) = ensure_exists(path) {
            return sink.abort(&e);
        }
        if let Err(source) = File::open(path) {
            return sink.abort(&BookSearchError::Unreadable {
                path: path.display().to_string(),
                source,
            });
        }

        match LopdfPages::load(path) {
            Ok(pages) => {
                tracing::debug!("{:?}: {} pages", path, pages.page_count());
                extract_pages(&pages, sink)
            }
            Err(e) => sink.abort(&e),
        }
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> ExtractionResult {
        PdfExtractor::extract(self, path)
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

/// Extract every page of `source` in order, recording failed pages in `sink`
pub fn extract_pages(source: &dyn PageSource, mut sink: ErrorSink) -> ExtractionResult {
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total);

    for page in 1..=total {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.page_text(page)))
            .unwrap_or_else(|_| Err("text extraction panicked".to_string()));

        match outcome {
            Ok(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    pages.push(text.to_string());
                }
            }
            Err(message) => sink.record_error(&BookSearchError::PageText {
                page,
                total,
                message,
            }),
        }
    }

    sink.finish(pages.join("\n"))
}
