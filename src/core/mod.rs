//! Core domain logic (frontend-agnostic)
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **extract**: EPUB, PDF and plain-text extraction
//! - **progress**: Shared progress record for indexing runs
//! - **snippet**: Preview window selection
//! - **storage**: Tantivy book index
//! - **search**: BM25 queries with snippets
//! - **indexer**: Library walking and run orchestration
//! - **library**: Listing the books directory
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod library;
pub mod progress;
pub mod search;
pub mod services;
pub mod snippet;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{BookSearchError, Result};
pub use services::Services;
