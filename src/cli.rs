//! Command-line interface definitions for dupescan.
//!
//! # Example
//!
//! ```bash
//! # Scan two trees and print duplicate groups as log lines
//! dupescan ~/Pictures /mnt/backup/Pictures
//!
//! # JSON output for scripting, ignore files under 1 MiB
//! dupescan ~/Downloads --output json --min-size 1MiB
//!
//! # Write the log to a file and show progress bars
//! dupescan /srv/data --log-file scan.log --progress
//! ```

use bytesize::ByteSize;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files by content.
///
/// Files are grouped by size, then by a hash of their first 64 KiB, then by a
/// hash of their full content. Only files that still share a group after the
/// last step are reported.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan for duplicates
    #[arg(value_name = "PATH", required_unless_present = "print_config")]
    pub paths: Vec<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for the duplicate report
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Minimum file size to consider (e.g., 2000, 4KiB, 1MB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Number of leading bytes covered by the partial hash
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub partial_size: Option<u64>,

    /// Number of threads hashing files within a stage (default: 1)
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Descend into directories reached through symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Write log lines to this file instead of stderr
    #[arg(long, value_name = "FILE", conflicts_with = "log_dir")]
    pub log_file: Option<PathBuf>,

    /// Write log lines to a timestamped file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Show progress bars on the terminal
    #[arg(long)]
    pub progress: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", env = "DUPESCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Timestamped `group,file,directory` lines
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Accepts plain byte counts and SI or IEC suffixes, case-insensitive.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_size;
///
/// assert_eq!(parse_size("2000").unwrap(), 2000);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64KiB").unwrap(), 65536);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty or not a valid size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
