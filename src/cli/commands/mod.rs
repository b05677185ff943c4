//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod completions;
pub mod config;
pub mod index;
pub mod list_books;
pub mod reset;
pub mod search;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use index::IndexArgs;
pub use list_books::ListBooksArgs;
pub use reset::ResetArgs;
pub use search::SearchArgs;
