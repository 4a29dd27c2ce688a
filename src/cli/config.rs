// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tagscan - read embedded tags from ASF/WMA, MP4/M4A and FLAC files
#[derive(Parser, Debug)]
#[command(name = "tagscan")]
#[command(about = "Read embedded music metadata and cover art", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with scan limits and separators
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read metadata from audio file(s)
    Read {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Include cover art bytes (base64) in the output
        #[arg(long)]
        with_art: bool,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect file format
    Detect {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Export cover art
    ExportCover {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output directory for cover images
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Batch process multiple files
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.flac", "*.m4a")
        #[arg(short, long)]
        pattern: String,
    },
}
