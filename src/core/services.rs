//! Unified service container for booksearch
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::indexer::{FileWalker, IndexingOrchestrator};
use crate::core::progress::ProgressTracker;
use crate::core::search::SearchService;
use crate::core::snippet::SnippetLocator;
use crate::core::storage::{BookIndex, IndexStore};
use std::sync::Arc;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Tantivy index holding one document per book
    pub index: Arc<BookIndex>,

    /// Progress of the current (or last) indexing run
    pub tracker: Arc<ProgressTracker>,

    /// Search service for BM25 queries
    pub search: Arc<SearchService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration, opening (or creating) the index
    pub fn new(config: Config) -> Result<Self> {
        let index = Arc::new(BookIndex::open_or_create(&config.storage.index_dir)?);
        Ok(Self::with_index(config, index))
    }

    /// Create services around an already opened index
    pub fn with_index(config: Config, index: Arc<BookIndex>) -> Self {
        let search = Arc::new(SearchService::new(
            Arc::clone(&index),
            SnippetLocator::new(config.search.snippet_window),
            config.library.books_dir.clone(),
            config.search.default_k,
            config.search.max_k,
            config.search.max_query_length,
        ));

        Self {
            index,
            tracker: Arc::new(ProgressTracker::new()),
            search,
            config: Arc::new(config),
        }
    }

    /// Create an orchestrator for the configured library
    ///
    /// Orchestrators are created per run; they all share this container's
    /// index and progress tracker.
    pub fn orchestrator(&self) -> Result<IndexingOrchestrator> {
        let walker = FileWalker::new(
            self.config.library.exclude_patterns.clone(),
            self.config.library.max_file_size_mb,
        )?;
        let store: Arc<dyn IndexStore> = self.index.clone();
        Ok(IndexingOrchestrator::new(
            walker,
            store,
            Arc::clone(&self.tracker),
        ))
    }
}
