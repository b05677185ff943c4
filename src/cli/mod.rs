//! CLI frontend for booksearch
//!
//! Provides the command-line interface over `core/`: indexing a library
//! with live progress, searching it and managing the index.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// booksearch - full-text search for your book library
///
/// Index a directory of EPUB, PDF and plain-text books, then search it
/// with keywords, phrases or boolean queries.
#[derive(Parser, Debug)]
#[command(name = "booksearch")]
#[command(version)]
#[command(about = "Full-text search for EPUB, PDF and text books", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index the books directory
    Index(commands::IndexArgs),

    /// Search indexed books with BM25 ranking
    Search(commands::SearchArgs),

    /// List the files in the books directory
    #[command(name = "list-books")]
    ListBooks(commands::ListBooksArgs),

    /// Delete every indexed book
    #[command(name = "reset-index")]
    ResetIndex(commands::ResetArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  booksearch completions bash > ~/.local/share/bash-completion/completions/booksearch
    ///   zsh:   booksearch completions zsh > ~/.zfunc/_booksearch
    ///   fish:  booksearch completions fish > ~/.config/fish/completions/booksearch.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    // Load configuration
    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    // Listing and showing config never touch the index
    match cli.command {
        Commands::ListBooks(args) => return commands::list_books::execute(args, &config, cli.format),
        Commands::ShowConfig(args) => {
            return commands::config::execute(args, &config, &xdg, cli.format)
        }
        _ => {}
    }

    // Create services
    let services = Arc::new(Services::new(config)?);

    // Execute command
    match cli.command {
        Commands::Index(args) => commands::index::execute(args, &services, cli.format).await,
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::ResetIndex(args) => commands::reset::execute(args, &services, cli.format).await,
        Commands::ListBooks(_) | Commands::ShowConfig(_) | Commands::Completions(_) => {
            unreachable!() // Handled above
        }
    }
}
