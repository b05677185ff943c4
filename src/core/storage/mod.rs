//! Storage layer for extracted book text.
//!
//! The indexer only sees the [`IndexStore`] trait; search uses the
//! concrete [`BookIndex`], which wraps Tantivy for BM25 full-text
//! search.
//!
//! # Storage Structure
//!
//! ```text
//! {index_dir}/
//! ├── meta.json           # Tantivy metadata
//! ├── .managed.json
//! └── [segment files]
//! ```

mod tantivy;

use std::path::Path;

use crate::core::error::Result;

pub use self::tantivy::{create_schema, BookIndex, IndexedBook, SCHEMA_VERSION};

/// Destination for extracted document text
pub trait IndexStore: Send + Sync {
    /// Store `content` under `document_id`, replacing any earlier version
    fn put(&self, document_id: &Path, content: &str) -> Result<()>;

    /// Make stored documents durable and visible to readers
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
