//! Search command - search indexed books

use crate::cli::output::{colors, highlight_markers};
use crate::cli::OutputFormat;
use crate::core::search::NO_SNIPPET;
use crate::core::services::Services;
use crate::core::snippet::highlight_terms;
use clap::Args;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (supports phrases and boolean operators: AND, OR, NOT)
    pub query: String,

    /// Maximum number of results (defaults to the configured default_k)
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Treat the query as plain text (ignore all query syntax)
    #[arg(long)]
    pub literal: bool,

    /// Only show file paths (no snippets)
    #[arg(long)]
    pub files_only: bool,
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services.search.search(&args.query, args.limit, args.literal)?;

    match format {
        OutputFormat::Human => {
            if response.results.is_empty() {
                println!("No results found for '{}'", colors::label(&args.query));
                return Ok(());
            }

            println!(
                "Found {} result(s) in {}ms:\n",
                colors::number(&response.count.to_string()),
                response.duration_ms
            );

            let (open, close) = highlight_markers();
            for (i, hit) in response.results.iter().enumerate() {
                if args.files_only {
                    println!("{}", colors::file_path(&hit.file_path));
                    continue;
                }

                println!(
                    "[{}] {} {}",
                    colors::rank(&(i + 1).to_string()),
                    colors::file_path(&hit.file_path),
                    colors::dim(&format!("(score: {:.2})", hit.score))
                );
                if hit.snippet == NO_SNIPPET {
                    println!("    {}", colors::dim(NO_SNIPPET));
                } else {
                    let snippet = hit.snippet.split_whitespace().collect::<Vec<_>>().join(" ");
                    println!(
                        "    {}",
                        highlight_terms(&snippet, &hit.matched_terms, open, close)
                    );
                }
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
