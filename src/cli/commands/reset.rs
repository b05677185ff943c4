//! Reset-index command - delete every indexed book

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use std::io::{self, Write};
use std::sync::Arc;

/// Arguments for the reset-index command
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Execute the reset-index command
pub async fn execute(
    args: ResetArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let before = services.index.doc_count()?;

    // Confirmation prompt unless --force
    if !args.force {
        print!(
            "Delete {} indexed book(s)? [y/N] ",
            colors::number(&before.to_string())
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", colors::dim("Cancelled."));
            return Ok(());
        }
    }

    services.index.reset()?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} book(s) from the index",
                colors::success("Deleted"),
                colors::number(&before.to_string())
            );
        }
        OutputFormat::Json => {
            let response = serde_json::json!({
                "reset": true,
                "deleted_documents": before
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
