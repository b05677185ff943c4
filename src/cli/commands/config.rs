//! Show-config command - show the effective configuration

use crate::cli::output::print_header;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show where config and data live
    #[arg(long, short = 'p')]
    pub paths: bool,
}

/// Resolved file locations
#[derive(Debug, Serialize)]
pub struct PathsInfo {
    pub config_file: String,
    pub config_file_exists: bool,
    pub data_dir: String,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    #[serde(flatten)]
    pub config: &'a Config,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathsInfo>,
}

/// Execute the show-config command
pub fn execute(
    args: ConfigArgs,
    config: &Config,
    xdg: &XdgDirs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = args.paths.then(|| PathsInfo {
        config_file: xdg.config_file().to_string_lossy().into_owned(),
        config_file_exists: xdg.config_file().exists(),
        data_dir: xdg.data_dir.to_string_lossy().into_owned(),
    });

    match format {
        OutputFormat::Human => {
            print_header("Configuration:");
            println!("  library:");
            println!("    books_dir: {}", config.library.books_dir.display());
            println!(
                "    exclude_patterns: {:?}",
                config.library.exclude_patterns
            );
            println!(
                "    max_file_size_mb: {}",
                config.library.max_file_size_mb
            );
            println!("  storage:");
            println!("    index_dir: {}", config.storage.index_dir.display());
            println!("  search:");
            println!("    default_k: {}", config.search.default_k);
            println!("    max_k: {}", config.search.max_k);
            println!("    max_query_length: {}", config.search.max_query_length);
            println!("    snippet_window: {}", config.search.snippet_window);

            if let Some(paths) = &paths {
                println!("  paths:");
                println!(
                    "    config_file: {}{}",
                    paths.config_file,
                    if paths.config_file_exists { "" } else { " (not present)" }
                );
                println!("    data_dir: {}", paths.data_dir);
            }
        }
        OutputFormat::Json => {
            let response = ConfigResponse { config, paths };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
