//! Plain-text reader. Bytes that are not valid UTF-8 are dropped.

use std::fs;
use std::path::Path;

use crate::core::error::BookSearchError;
use crate::core::extract::{ensure_exists, ErrorSink, TextExtractor};
use crate::core::types::ExtractionResult;

#[derive(Debug, Default, Clone)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, path: &Path) -> ExtractionResult {
        let sink = ErrorSink::for_path(path);

        if let Err(e) = ensure_exists(path) {
            return sink.abort(&e);
        }

        match fs::read(path) {
            Ok(bytes) => sink.finish(lossy_utf8(&bytes)),
            Err(source) => sink.abort(&BookSearchError::Unreadable {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> ExtractionResult {
        PlainTextExtractor::extract(self, path)
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

/// Decode UTF-8, skipping invalid sequences instead of replacing them
fn lossy_utf8(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
