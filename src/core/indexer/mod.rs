//! Library indexing module.
//!
//! Walks a books directory, extracts each document and hands the text
//! to an [`IndexStore`](crate::core::storage::IndexStore). Key features:
//!
//! - Supported-format filtering with glob exclusions and a size limit
//! - Per-file fault isolation (one bad book never stops a run)
//! - Live progress through a shared [`ProgressTracker`](crate::core::progress::ProgressTracker)
//! - Cooperative cancellation between files

pub mod orchestrator;
pub mod walker;

pub use orchestrator::{CancelFlag, IndexingOrchestrator};
pub use walker::FileWalker;
