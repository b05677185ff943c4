//! BM25 book search with snippet previews.
//!
//! Tantivy ranks the books; the [`SnippetLocator`] then picks a preview
//! window from each hit's stored text.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::core::error::{BookSearchError, Result};
use crate::core::search::preprocess_query;
use crate::core::snippet::{SnippetLocator, SnippetOutcome};
use crate::core::storage::{BookIndex, IndexedBook};
use crate::core::types::{SearchHit, SearchResponse};

/// Snippet text for hits where no preview window could be found
pub const NO_SNIPPET: &str = "No snippet found";

/// BM25 search service
pub struct SearchService {
    index: Arc<BookIndex>,
    locator: SnippetLocator,
    books_dir: PathBuf,
    default_k: usize,
    max_k: usize,
    max_query_length: usize,
}

impl SearchService {
    /// Create a new search service
    pub fn new(
        index: Arc<BookIndex>,
        locator: SnippetLocator,
        books_dir: PathBuf,
        default_k: usize,
        max_k: usize,
        max_query_length: usize,
    ) -> Self {
        Self {
            index,
            locator,
            books_dir,
            default_k,
            max_k,
            max_query_length,
        }
    }

    /// Execute a search query
    ///
    /// # Arguments
    ///
    /// * `query_str` - User query
    /// * `k` - Result limit (defaults to `default_k`, capped at `max_k`)
    /// * `literal` - Escape all query syntax
    pub fn search(&self, query_str: &str, k: Option<usize>, literal: bool) -> Result<SearchResponse> {
        let start = Instant::now();

        if query_str.trim().is_empty() {
            return Err(BookSearchError::InvalidQuery(
                "Query cannot be empty".to_string(),
            ));
        }
        if query_str.len() > self.max_query_length {
            return Err(BookSearchError::InvalidQuery(format!(
                "Query is longer than {} bytes",
                self.max_query_length
            )));
        }

        let k_limit = k.unwrap_or(self.default_k).min(self.max_k).max(1);
        let parsed = preprocess_query(query_str, literal);
        tracing::debug!("Searching for {:?} (parsed as {:?}, k={})", query_str, parsed, k_limit);

        let books = self.index.search(&parsed, k_limit)?;
        let snippet_query = snippet_terms(query_str);

        let results: Vec<SearchHit> = books
            .into_iter()
            .map(|book| self.to_hit(book, &snippet_query))
            .collect();

        let duration_ms = start.elapsed().as_millis() as u64;
        let count = results.len();
        tracing::info!("Query {:?}: {} results in {}ms", query_str, count, duration_ms);

        Ok(SearchResponse {
            query: query_str.to_string(),
            results,
            count,
            duration_ms,
        })
    }

    fn to_hit(&self, book: IndexedBook, query: &str) -> SearchHit {
        let (snippet, matched_terms) = match self.locator.find(&book.content, query) {
            SnippetOutcome::Found(window) => (
                window.excerpt(&book.content).trim().to_string(),
                window.matched_terms.into_iter().collect(),
            ),
            SnippetOutcome::NoMatch => (NO_SNIPPET.to_string(), Vec::new()),
            SnippetOutcome::MatchError(reason) => {
                tracing::warn!("No snippet for {}: {}", book.file_path, reason);
                (NO_SNIPPET.to_string(), Vec::new())
            }
        };

        SearchHit {
            file_path: self.display_path(&book.file_path),
            snippet,
            matched_terms,
            score: book.score,
        }
    }

    /// Path relative to the books directory when it lies inside it
    fn display_path(&self, file_path: &str) -> String {
        Path::new(file_path)
            .strip_prefix(&self.books_dir)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| file_path.to_string())
    }
}

/// The query as plain words for snippet location: query syntax such as
/// quotes, field prefixes and boolean operators removed
fn snippet_terms(query: &str) -> String {
    query
        .split_whitespace()
        .filter(|w| !matches!(*w, "AND" | "OR" | "NOT"))
        .map(|w| {
            let w = w.trim_start_matches(['+', '-']);
            let w = w
                .strip_prefix("content:")
                .or_else(|| w.strip_prefix("file_path:"))
                .unwrap_or(w);
            w.trim_matches(|c: char| matches!(c, '"' | '(' | ')'))
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
