//! Configuration management for booksearch.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{BookSearchError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Library (books directory) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Directory holding the books to index
    #[serde(default = "default_books_dir")]
    pub books_dir: PathBuf,

    /// Paths to skip while walking (glob syntax)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory of the Tantivy book index
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default number of results to return
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Maximum results per query
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Maximum query string length
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Snippet window width in bytes
    #[serde(default = "default_snippet_window")]
    pub snippet_window: usize,
}

// Default value functions
fn default_books_dir() -> PathBuf {
    PathBuf::from("./books")
}

fn default_exclude_patterns() -> Vec<String> {
    vec!["**/.Trash*".to_string(), "**/*.part".to_string()]
}

fn default_max_file_size() -> usize {
    200
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

fn default_k() -> usize {
    10
}

fn default_max_k() -> usize {
    100
}

fn default_max_query_length() -> usize {
    500
}

fn default_snippet_window() -> usize {
    crate::core::snippet::DEFAULT_WINDOW
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            books_dir: default_books_dir(),
            exclude_patterns: default_exclude_patterns(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            max_query_length: default_max_query_length(),
            snippet_window: default_snippet_window(),
        }
    }
}

/// Parse an env var, ignoring it when unset or malformed
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", name, value);
            None
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BookSearchError::ConfigError(format!("Failed to read config file: {e}"))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// File priority order:
    /// 1. BOOKSEARCH_CONFIG env var
    /// 2. XDG config file (~/.config/booksearch/config.toml)
    /// 3. ./booksearch.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        xdg.log_paths();

        let mut config = if let Ok(config_path) = env::var("BOOKSEARCH_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("booksearch.toml").exists() {
                Self::from_file("booksearch.toml")?
            } else {
                Self::default()
            }
        };

        // Keep the index under the XDG data directory unless set explicitly
        if config.storage.index_dir == default_index_dir() {
            config.storage.index_dir = xdg.index_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Library configuration
        if let Ok(dir) = env::var("BOOKSEARCH_BOOKS_DIR") {
            self.library.books_dir = PathBuf::from(dir);
        }
        if let Ok(patterns) = env::var("BOOKSEARCH_EXCLUDE_PATTERNS") {
            self.library.exclude_patterns = patterns
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(size) = env_parse("BOOKSEARCH_MAX_FILE_SIZE_MB") {
            self.library.max_file_size_mb = size;
        }

        // Storage configuration
        if let Ok(dir) = env::var("BOOKSEARCH_INDEX_DIR") {
            self.storage.index_dir = PathBuf::from(dir);
        }

        // Search configuration
        if let Some(k) = env_parse("BOOKSEARCH_DEFAULT_K") {
            self.search.default_k = k;
        }
        if let Some(k) = env_parse("BOOKSEARCH_MAX_K") {
            self.search.max_k = k;
        }
        if let Some(len) = env_parse("BOOKSEARCH_MAX_QUERY_LENGTH") {
            self.search.max_query_length = len;
        }
        if let Some(window) =
            env_parse("BOOKSEARCH_SNIPPET_WINDOW").or_else(|| env_parse("SNIPPET_CHAR_LIMIT"))
        {
            self.search.snippet_window = window;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.library.max_file_size_mb == 0 {
            return Err(BookSearchError::ConfigError(
                "Max file size must be non-zero".to_string(),
            ));
        }

        if self.search.default_k == 0 {
            return Err(BookSearchError::ConfigError(
                "Default k must be non-zero".to_string(),
            ));
        }

        if self.search.default_k > self.search.max_k {
            return Err(BookSearchError::ConfigError(
                "Default k cannot exceed max k".to_string(),
            ));
        }

        if self.search.max_query_length == 0 {
            return Err(BookSearchError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        if self.search.snippet_window == 0 {
            return Err(BookSearchError::ConfigError(
                "Snippet window must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Books dir: {:?}", self.library.books_dir);
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.library.exclude_patterns.len()
        );
        tracing::info!("  Max file size: {} MB", self.library.max_file_size_mb);
        tracing::info!("  Index dir: {:?}", self.storage.index_dir);
        tracing::info!("  Default k: {}", self.search.default_k);
        tracing::info!("  Max k: {}", self.search.max_k);
        tracing::info!("  Max query length: {}", self.search.max_query_length);
        tracing::info!("  Snippet window: {}", self.search.snippet_window);
    }
}
