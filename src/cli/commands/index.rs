//! Index command - index the books directory with live progress

use crate::cli::output::{colors, format_clock, format_completion, format_duration};
use crate::cli::OutputFormat;
use crate::core::progress::ProgressSnapshot;
use crate::core::services::Services;
use crate::core::types::{ErrorMessage, RunSummary};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Errors listed individually in human output
const MAX_LISTED_ERRORS: usize = 20;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Books directory (defaults to the configured library)
    pub path: Option<PathBuf>,

    /// Delete every indexed book before indexing
    #[arg(long)]
    pub reset: bool,

    /// Progress refresh interval in milliseconds
    #[arg(long, default_value = "500")]
    pub interval_ms: u64,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Indexing result response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub path: String,
    #[serde(flatten)]
    pub summary: RunSummary,
    pub documents_in_index: u64,
    pub errors: Vec<ErrorMessage>,
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args
        .path
        .unwrap_or_else(|| services.config.library.books_dir.clone());
    let path = path.canonicalize().map_err(|e| {
        format!(
            "Invalid books directory '{}': {}. Make sure the path exists and is accessible.",
            path.display(),
            e
        )
    })?;

    if !path.is_dir() {
        return Err(format!("Books path '{}' is not a directory.", path.display()).into());
    }

    if args.reset {
        services.index.reset()?;
    }

    let show_progress = !args.quiet && format == OutputFormat::Human;
    if show_progress {
        eprintln!(
            "Indexing {}... (Ctrl-C stops after the current file)",
            colors::file_path(&path.display().to_string())
        );
    }

    let orchestrator = services.orchestrator()?;
    let cancel = orchestrator.cancel_flag();
    let root = path.clone();
    let mut run = tokio::task::spawn_blocking(move || orchestrator.run(&root));

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(50)));
    let mut cancel_requested = false;

    let summary = loop {
        tokio::select! {
            result = &mut run => break result?,
            _ = ticker.tick() => {
                if show_progress {
                    if let Some(snapshot) = services.tracker.snapshot() {
                        render_progress(&snapshot);
                    }
                }
            }
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                cancel_requested = true;
                cancel.cancel();
                if show_progress {
                    eprintln!();
                    eprintln!("{}", colors::warning("Stopping after the current file..."));
                }
            }
        }
    };

    if show_progress {
        // Clear the progress line
        eprint!("\r\x1b[2K");
    }

    let response = IndexResponse {
        path: path.to_string_lossy().into_owned(),
        documents_in_index: services.index.doc_count()?,
        errors: services.tracker.errors(),
        summary,
    };

    match format {
        OutputFormat::Human => print_summary(&response, &path),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// One-line progress display, redrawn in place
fn progress_line(snapshot: &ProgressSnapshot) -> String {
    let current = Path::new(&snapshot.current_file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!(
        "[{}] {:>5.1}% {}/{} | elapsed {} | remaining {} | done at {} | {}",
        snapshot.phase,
        snapshot.percentage,
        snapshot.processed_files,
        snapshot.total_files,
        format_clock(snapshot.elapsed_secs),
        format_clock(snapshot.estimated_remaining_secs),
        format_completion(snapshot.estimated_completion),
        current
    )
}

fn render_progress(snapshot: &ProgressSnapshot) {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "\r\x1b[2K{}", progress_line(snapshot));
    let _ = stderr.flush();
}

fn print_summary(response: &IndexResponse, path: &Path) {
    let summary = &response.summary;
    let verb = if summary.cancelled {
        colors::warning("Stopped")
    } else {
        colors::success("Indexed")
    };

    println!(
        "{} {} of {} files from {} in {}",
        verb,
        colors::number(&summary.indexed_files.to_string()),
        colors::number(&summary.total_files.to_string()),
        colors::file_path(&path.display().to_string()),
        colors::number(&format_duration(summary.duration_ms as f64 / 1000.0))
    );
    println!(
        "Index holds {} book(s)",
        colors::number(&response.documents_in_index.to_string())
    );

    if response.errors.is_empty() {
        return;
    }

    println!(
        "\n{} {}:",
        colors::number(&response.errors.len().to_string()),
        colors::error("error(s)")
    );
    for error in response.errors.iter().take(MAX_LISTED_ERRORS) {
        println!("  {} {}", colors::dim(&format!("[{}]", error.kind)), error);
    }
    if response.errors.len() > MAX_LISTED_ERRORS {
        println!(
            "  {}",
            colors::dim(&format!(
                "... and {} more (use --format json for the full list)",
                response.errors.len() - MAX_LISTED_ERRORS
            ))
        );
    }
}
