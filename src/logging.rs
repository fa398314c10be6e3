//! Logging infrastructure for dupescan.
//!
//! This module provides logging through the `log` facade with an `env_logger`
//! backend. Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Every line is written as `YYYY/MM/DD HH:MM:SS,<message>` in local time.
//! Records above info level carry their level in front of the message.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupescan::logging::{init_logging, LogTarget};
//!
//! init_logging(1, false, &LogTarget::Stderr).unwrap();
//! log::info!("scan starting");
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp layout used on every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard error.
    #[default]
    Stderr,
    /// An explicit file, truncated on open.
    File(PathBuf),
    /// A fresh `dedupe-<timestamp>.log` file inside this directory.
    Directory(PathBuf),
}

impl LogTarget {
    /// Pick the target from the `--log-file` and `--log-dir` flags.
    #[must_use]
    pub fn from_flags(log_file: Option<&Path>, log_dir: Option<&Path>) -> Self {
        match (log_file, log_dir) {
            (Some(file), _) => Self::File(file.to_path_buf()),
            (None, Some(dir)) => Self::Directory(dir.to_path_buf()),
            (None, None) => Self::Stderr,
        }
    }

    /// Resolve to a concrete file path, if this target writes to a file.
    #[must_use]
    pub fn file_path(&self, now: DateTime<Local>) -> Option<PathBuf> {
        match self {
            Self::Stderr => None,
            Self::File(path) => Some(path.clone()),
            Self::Directory(dir) => Some(dir.join(log_file_name(now))),
        }
    }
}

/// Initialize the logging subsystem.
///
/// Returns the path of the log file when logging goes to a file.
/// A second call in the same process leaves the first logger in place.
///
/// # Errors
///
/// Returns an error if the log file or its directory cannot be created.
pub fn init_logging(verbose: u8, quiet: bool, target: &LogTarget) -> Result<Option<PathBuf>> {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}",
            format_line(Local::now(), record.level(), &record.args().to_string())
        )
    });

    let log_path = target.file_path(Local::now());
    match &log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping the existing one");
        return Ok(log_path);
    }

    log::debug!("Logging initialized at level: {}", current_level_name());
    Ok(log_path)
}

/// Flush any buffered log output.
pub fn flush() {
    log::logger().flush();
}

/// Render one log line.
#[must_use]
pub fn format_line(now: DateTime<Local>, level: Level, message: &str) -> String {
    let timestamp = now.format(TIMESTAMP_FORMAT);
    match level {
        Level::Info => format!("{timestamp},{message}"),
        other => format!("{timestamp},{other}: {message}"),
    }
}

/// File name used for `--log-dir` logs.
#[must_use]
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("dedupe-{}.log", now.format("%Y%m%dT%H:%M:%S"))
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Get the current log level as a string.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
