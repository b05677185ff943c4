//! Tantivy-backed book index.
//!
//! One document per book, keyed by its path. Putting a path that is
//! already indexed replaces the previous document on the next flush.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::*;
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument, Term};

use crate::core::error::{BookSearchError, Result};
use crate::core::storage::IndexStore;

/// Current schema version
/// Version 1: file_path, content and indexed_at per book
pub const SCHEMA_VERSION: u32 = 1;

/// Writer heap size in bytes
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Create the Tantivy schema for book indexing
///
/// Fields:
/// - file_path: Book path, unique key (STRING | STORED)
/// - content: Extracted text (TEXT | STORED)
/// - indexed_at: Timestamp (Date | STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field("file_path", STRING | STORED);
    builder.add_text_field("content", TEXT | STORED);
    builder.add_date_field("indexed_at", STORED);

    builder.build()
}

#[derive(Debug, Clone, Copy)]
struct BookFields {
    file_path: Field,
    content: Field,
    indexed_at: Field,
}

impl BookFields {
    fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema.get_field(name).map_err(|e| {
                BookSearchError::IndexStore(format!("Missing {name} field: {e}"))
            })
        };
        Ok(Self {
            file_path: field("file_path")?,
            content: field("content")?,
            indexed_at: field("indexed_at")?,
        })
    }
}

/// A stored book returned by a search
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedBook {
    pub file_path: String,
    pub content: String,
    pub score: f32,
}

/// Tantivy index of extracted book text
pub struct BookIndex {
    index: Index,
    fields: BookFields,
    writer: Mutex<IndexWriter>,
}

impl std::fmt::Debug for BookIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookIndex")
            .field("schema_version", &SCHEMA_VERSION)
            .finish()
    }
}

impl BookIndex {
    /// Create a new index in `index_dir`
    pub fn create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let index = Index::create_in_dir(index_dir, create_schema())
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to create index: {e}")))?;
        Self::from_index(index)
    }

    /// Open an existing index
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to open index: {e}")))?;
        Self::from_index(index)
    }

    /// Open the index in `index_dir`, creating it on first use
    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        if index_dir.join("meta.json").exists() {
            tracing::debug!("Opening book index at {:?}", index_dir);
            Self::open(index_dir)
        } else {
            tracing::info!("Creating book index at {:?}", index_dir);
            Self::create(index_dir)
        }
    }

    /// Index held in memory only
    pub fn in_memory() -> Result<Self> {
        Self::from_index(Index::create_in_ram(create_schema()))
    }

    fn from_index(index: Index) -> Result<Self> {
        let fields = BookFields::resolve(&index.schema())?;
        let writer = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to create writer: {e}")))?;

        Ok(Self {
            index,
            fields,
            writer: Mutex::new(writer),
        })
    }

    fn writer(&self) -> MutexGuard<'_, IndexWriter> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reader(&self) -> Result<IndexReader> {
        self.index
            .reader()
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to create reader: {e}")))
    }

    /// Add or replace the document for `file_path`
    pub fn put_book(&self, file_path: &Path, content: &str) -> Result<()> {
        let key = file_path.to_string_lossy();
        let writer = self.writer();

        writer.delete_term(Term::from_field_text(self.fields.file_path, &key));
        writer
            .add_document(doc!(
                self.fields.file_path => &*key,
                self.fields.content => content,
                self.fields.indexed_at => tantivy::DateTime::from_timestamp_secs(
                    Utc::now().timestamp()
                ),
            ))
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to add document: {e}")))?;
        Ok(())
    }

    /// Commit pending changes
    pub fn commit(&self) -> Result<()> {
        self.writer()
            .commit()
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to commit: {e}")))?;
        Ok(())
    }

    /// Delete every document and commit
    pub fn reset(&self) -> Result<()> {
        let mut writer = self.writer();
        writer
            .delete_all_documents()
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to clear index: {e}")))?;
        writer
            .commit()
            .map_err(|e| BookSearchError::IndexStore(format!("Failed to commit: {e}")))?;
        tracing::info!("Book index reset");
        Ok(())
    }

    /// Number of committed documents
    pub fn doc_count(&self) -> Result<u64> {
        Ok(self.reader()?.searcher().num_docs())
    }

    /// BM25 search over book content
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<IndexedBook>> {
        let searcher = self.reader()?.searcher();

        let parser = QueryParser::for_index(&self.index, vec![self.fields.content]);
        let parsed = parser
            .parse_query(query)
            .map_err(|e| BookSearchError::InvalidQuery(format!("Failed to parse query: {e}")))?;

        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(limit.max(1)))
            .map_err(|e| BookSearchError::SearchFailed(format!("Search failed: {e}")))?;

        let mut books = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address).map_err(|e| {
                BookSearchError::SearchFailed(format!("Failed to retrieve document: {e}"))
            })?;
            books.push(IndexedBook {
                file_path: stored_text(&doc, self.fields.file_path),
                content: stored_text(&doc, self.fields.content),
                score,
            });
        }
        Ok(books)
    }
}

fn stored_text(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

impl IndexStore for BookIndex {
    fn put(&self, document_id: &Path, content: &str) -> Result<()> {
        self.put_book(document_id, content)
    }

    fn flush(&self) -> Result<()> {
        self.commit()
    }
}
