//! booksearch - full-text search over a personal book library
//!
//! Extracts text from EPUB, PDF and plain-text books, indexes it with
//! BM25 via Tantivy and returns ranked hits with a snippet around the
//! matched terms.
//!
//! # Architecture
//!
//! - **core**: Domain logic (frontend-agnostic)
//!   - config, error, types, xdg
//!   - extract (EPUB, PDF, text; per-item error collection)
//!   - indexer (file walking, run orchestration, cancellation)
//!   - progress (live run state for pollers)
//!   - snippet, search, storage
//!   - services (unified service container)
//!
//! - **cli**: clap frontend (depends on core)
//!
//! # Key Features
//!
//! - Fault isolation: a broken chapter, page or file is recorded and
//!   skipped, never fatal to the batch
//! - Progress snapshots safe to poll while a run is active
//! - Snippets that degrade from exact phrase to partial term matches

// Core domain logic
pub mod core;

// Command-line frontend
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{BookSearchError, Result};
pub use core::services::Services;
pub use core::types::*;
