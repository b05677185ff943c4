//! Library listing.
//!
//! Lists the files at the top level of the books directory with a
//! display title and their sizes.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::core::error::{BookSearchError, Result};
use crate::core::extract::{DocumentKind, EpubExtractor};

/// One file of the library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookEntry {
    pub name: String,
    pub title: String,
    pub size: u64,
    pub size_mb: f64,
    /// Supported format, if any
    pub format: Option<&'static str>,
}

/// Library contents with totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryListing {
    pub files: Vec<BookEntry>,
    pub total_files: usize,
    pub total_size: u64,
    pub total_size_mb: f64,
}

/// List the regular files directly inside `books_dir`, sorted by name
pub fn list_books(books_dir: &Path) -> Result<LibraryListing> {
    let entries = fs::read_dir(books_dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BookSearchError::NotFound(books_dir.display().to_string())
        } else {
            BookSearchError::Unreadable {
                path: books_dir.display().to_string(),
                source: e,
            }
        }
    })?;

    let epub = EpubExtractor::new();
    let mut files = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", books_dir, e);
                continue;
            }
        };
        let metadata = match entry.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let kind = DocumentKind::from_path(&path);

        let mut title = title_from_file_name(&name);
        if kind == Some(DocumentKind::Epub) && title == name {
            if let Ok(Some(package_title)) = epub.metadata(&path).map(|m| m.title) {
                title = package_title;
            }
        }

        files.push(BookEntry {
            size: metadata.len(),
            size_mb: to_mb(metadata.len()),
            format: kind.map(|k| k.as_str()),
            name,
            title,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    let total_size = files.iter().map(|f| f.size).sum();

    Ok(LibraryListing {
        total_files: files.len(),
        total_size,
        total_size_mb: to_mb(total_size),
        files,
    })
}

/// Title from a `Title - Author.ext` style file name: everything before
/// the last " - ". Names without the separator are returned unchanged.
pub fn title_from_file_name(name: &str) -> String {
    match name.rsplit_once(" - ") {
        Some((title, _)) if !title.trim().is_empty() => title.to_string(),
        _ => name.to_string(),
    }
}

/// Bytes to megabytes, rounded to two decimals
fn to_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}
