// CLI module for tagscan
//
// Command-line front end over the library: argument parsing, logging setup,
// output formatting and the subcommands.

pub mod commands;
pub mod config;
pub mod output;

use std::path::Path;

use tagscan::{ScanConfig, ScanError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub use config::{Commands, Config, OutputFormat};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{path}: {source}")]
    Scan {
        path: String,
        #[source]
        source: ScanError,
    },

    #[error("No embedded cover art in {0}")]
    NoCover(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Error: {0}")]
    Other(String),
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `--verbose` means debug and `--quiet` means error.
pub fn init_logging(config: &Config) {
    let level = if config.verbose {
        "debug"
    } else if config.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // a second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose)
        .try_init();
}

/// Load `--config`, or the defaults when it is absent.
pub fn load_scan_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    use anyhow::Context;

    let Some(path) = path else {
        return Ok(ScanConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    ScanConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
}
