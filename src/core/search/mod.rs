//! Search module for BM25 full-text search.
//!
//! Books are ranked with Tantivy's BM25 implementation and each hit
//! gets a snippet from the [`SnippetLocator`](crate::core::snippet::SnippetLocator).

mod bm25;
mod query;

pub use bm25::{SearchService, NO_SNIPPET};
pub use query::preprocess_query;
