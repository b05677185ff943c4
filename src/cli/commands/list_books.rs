//! List-books command - list the files in the books directory

use crate::cli::output::{colors, format_bytes};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::library::list_books;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the list-books command
#[derive(Args, Debug)]
pub struct ListBooksArgs {
    /// Books directory (defaults to the configured library)
    pub path: Option<PathBuf>,
}

/// Execute the list-books command
pub fn execute(
    args: ListBooksArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = args
        .path
        .unwrap_or_else(|| config.library.books_dir.clone());
    let listing = list_books(&dir)?;

    match format {
        OutputFormat::Human => {
            if listing.files.is_empty() {
                println!(
                    "No files in {}",
                    colors::file_path(&dir.display().to_string())
                );
                return Ok(());
            }

            for book in &listing.files {
                let format_label = book.format.unwrap_or("-");
                println!(
                    "{:>10}  {:<5} {}",
                    format_bytes(book.size),
                    colors::dim(format_label),
                    colors::title(&book.title)
                );
                if book.title != book.name {
                    println!("{:>17} {}", "", colors::dim(&book.name));
                }
            }
            println!(
                "\n{} file(s), {} MB total",
                colors::number(&listing.total_files.to_string()),
                colors::number(&format!("{:.2}", listing.total_size_mb))
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    Ok(())
}
