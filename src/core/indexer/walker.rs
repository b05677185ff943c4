//! Library walker.
//!
//! Traverses a books directory and keeps the files whose extension is
//! a supported document format. Glob-excluded paths are skipped. Hidden
//! directories are walked like any other.
//! The size limit is checked per file by the orchestrator so oversized
//! books are counted and reported. Walk errors (permission denied,
//! etc.) are logged and do not stop the walk.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{BookSearchError, Result};
use crate::core::extract::DocumentKind;

/// File system walker that yields supported documents
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// Patterns to exclude (e.g., "**/drafts/**")
    exclude_patterns: Vec<Pattern>,

    /// Maximum file size in bytes (larger files are reported, not read)
    max_file_size_bytes: u64,
}

impl FileWalker {
    /// Create a new file walker
    ///
    /// # Arguments
    ///
    /// * `exclude_patterns` - Glob patterns for paths to exclude
    /// * `max_file_size_mb` - Maximum file size in megabytes
    ///
    /// # Returns
    ///
    /// A new `FileWalker` or an error if a pattern is invalid
    pub fn new(exclude_patterns: Vec<String>, max_file_size_mb: usize) -> Result<Self> {
        let exclude = exclude_patterns
            .into_iter()
            .map(|p| {
                Pattern::new(&p).map_err(|e| {
                    BookSearchError::ConfigError(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            exclude_patterns: exclude,
            max_file_size_bytes: (max_file_size_mb as u64) * 1024 * 1024,
        })
    }

    /// Collect every supported document under `root`, sorted by path
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(BookSearchError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, root))
        {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if DocumentKind::from_path(path).is_none() {
                        continue;
                    }

                    if !self.is_excluded(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check a document against the size limit
    pub fn check_size(&self, path: &Path) -> Result<()> {
        let size = std::fs::metadata(path)
            .map_err(|source| BookSearchError::Unreadable {
                path: path.display().to_string(),
                source,
            })?
            .len();

        if size > self.max_file_size_bytes {
            return Err(BookSearchError::TooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// Filters out excluded directories. Never filters the root itself.
    fn should_process_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();

        if path == root {
            return true;
        }

        if entry.file_type().is_dir() && self.exclude_patterns.iter().any(|p| p.matches_path(path))
        {
            tracing::debug!("Skipping excluded directory: {:?}", path);
            return false;
        }

        true
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let file_name = path.file_name().and_then(|f| f.to_str());
        self.exclude_patterns
            .iter()
            .any(|p| p.matches_path(path) || file_name.is_some_and(|f| p.matches(f)))
    }
}
