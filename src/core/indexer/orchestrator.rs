//! Indexing run orchestration.
//!
//! A run moves through `Idle → Counting → Processing → Done`:
//! 1. Count: walk the library and collect supported documents
//! 2. Process: extract each document and hand its text to the store
//! 3. Flush the store and finish the tracked run
//!
//! One bad file never aborts the batch. Every failure ends up in the
//! tracker's error log and the loop moves on to the next file.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::core::error::BookSearchError;
use crate::core::extract::{DocumentKind, ExtractorSet};
use crate::core::indexer::FileWalker;
use crate::core::progress::{ProgressTracker, RunPhase};
use crate::core::storage::IndexStore;
use crate::core::types::{ErrorKind, ErrorMessage, RunSummary};

/// Cooperative stop request, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives extraction and indexing of a whole library
pub struct IndexingOrchestrator {
    walker: FileWalker,
    extractors: ExtractorSet,
    store: Arc<dyn IndexStore>,
    tracker: Arc<ProgressTracker>,
    cancel: CancelFlag,
}

impl IndexingOrchestrator {
    /// Create an orchestrator with the default extractors
    ///
    /// # Arguments
    ///
    /// * `walker` - Library walker (exclusions, size limit)
    /// * `store` - Destination for extracted text
    /// * `tracker` - Shared progress record, polled by readers
    pub fn new(
        walker: FileWalker,
        store: Arc<dyn IndexStore>,
        tracker: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            walker,
            extractors: ExtractorSet::default(),
            store,
            tracker,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_extractors(mut self, extractors: ExtractorSet) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle for stopping the run from another thread
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    /// Index every supported document under `root`.
    ///
    /// Resets the tracker, so runs must not overlap. Serializing runs
    /// is up to the caller.
    pub fn run(&self, root: &Path) -> RunSummary {
        let start = Instant::now();
        let run = self.tracker.begin_run(0);
        let tracker = run.tracker();

        tracing::info!("Counting documents under {:?}", root);
        let files = match self.walker.collect_files(root) {
            Ok(files) => files,
            Err(e) => {
                tracing::error!("Cannot walk {:?}: {}", root, e);
                tracker.append_error(ErrorMessage::new(
                    e.kind(),
                    root.display().to_string(),
                    e.to_string(),
                ));
                Vec::new()
            }
        };
        tracker.set_total(files.len());
        tracker.set_phase(RunPhase::Processing);
        tracing::info!("Found {} documents to index", files.len());

        let mut summary = RunSummary {
            total_files: files.len(),
            ..RunSummary::default()
        };

        for (idx, path) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Indexing cancelled after {}/{} files",
                    summary.processed_files,
                    files.len()
                );
                summary.cancelled = true;
                break;
            }

            if idx % 100 == 0 && idx > 0 {
                tracing::info!("Progress: {}/{} files processed", idx, files.len());
            }

            tracker.set_current(path.display().to_string());
            if self.process_file(path) {
                summary.indexed_files += 1;
            }
            tracker.increment();
            summary.processed_files += 1;
        }

        let flushed = panic::catch_unwind(AssertUnwindSafe(|| self.store.flush()))
            .unwrap_or_else(|_| Err(BookSearchError::IndexStore("flush panicked".to_string())));
        if let Err(e) = flushed {
            tracing::error!("Failed to flush index store: {}", e);
            tracker.append_error(ErrorMessage::new(
                ErrorKind::IndexStoreFailure,
                root.display().to_string(),
                e.to_string(),
            ));
        }

        summary.error_count = tracker.errors().len();
        drop(run);

        summary.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Indexing complete: {} of {} files processed, {} indexed, {} errors in {}ms",
            summary.processed_files,
            summary.total_files,
            summary.indexed_files,
            summary.error_count,
            summary.duration_ms
        );

        summary
    }

    /// Extract and store one document. Returns whether the store accepted it.
    ///
    /// Text that extracts to nothing is still stored, replacing whatever
    /// an earlier run indexed for the same path.
    fn process_file(&self, path: &Path) -> bool {
        let Some(kind) = DocumentKind::from_path(path) else {
            return false;
        };
        let extractor = self.extractors.get(kind);
        let context = path.display().to_string();

        if let Err(e) = self.walker.check_size(path) {
            tracing::warn!("Not indexing {:?}: {}", path, e);
            self.tracker
                .append_error(ErrorMessage::new(e.kind(), context, e.to_string()));
            return false;
        }

        let result = match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path))) {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("{} extractor panicked on {:?}", extractor.name(), path);
                self.tracker.append_error(ErrorMessage::new(
                    ErrorKind::StructuralParse,
                    context,
                    format!("{} extractor panicked", extractor.name()),
                ));
                return false;
            }
        };

        let text = result.text;
        self.tracker.extend_errors(result.errors);

        if text.trim().is_empty() {
            tracing::debug!("No text extracted from {:?}", path);
        }

        let stored = panic::catch_unwind(AssertUnwindSafe(|| self.store.put(path, &text)))
            .unwrap_or_else(|_| Err(BookSearchError::IndexStore("store panicked".to_string())));
        match stored {
            Ok(()) => {
                tracing::debug!("Indexed {:?} ({} bytes of text)", path, text.len());
                true
            }
            Err(e) => {
                tracing::warn!("Index store rejected {:?}: {}", path, e);
                self.tracker.append_error(ErrorMessage::new(
                    ErrorKind::IndexStoreFailure,
                    context,
                    e.to_string(),
                ));
                false
            }
        }
    }
}
