//! dupescan - duplicate file finder
//!
//! Finds files with identical content under one or more directory trees.
//! Candidates are narrowed in stages: by size, by a SHA-1 of the first 64 KiB,
//! then by a SHA-1 of the full content. Only the last stage confirms a
//! duplicate.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, ScanSummary};
use crate::error::ExitCode;
use crate::logging::LogTarget;
use crate::output::{JsonOutput, TextReport};
use crate::progress::{LogProgress, Progress, ProgressCallback, ProgressFanout};

/// Run one scan as described by the command line.
///
/// # Errors
///
/// Returns an error when configuration is invalid, the log file cannot be
/// created, no root can be scanned, or the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.merge_cli(&cli);
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let target = LogTarget::from_flags(cli.log_file.as_deref(), cli.log_dir.as_deref());
    if let Some(path) = logging::init_logging(cli.verbose, cli.quiet, &target)? {
        log::debug!("Logging to {}", path.display());
    }

    let log_sink: Arc<dyn ProgressCallback> = Arc::new(LogProgress::new());
    let sink: Arc<dyn ProgressCallback> = if cli.progress {
        Arc::new(
            ProgressFanout::new()
                .with(Arc::clone(&log_sink))
                .with(Arc::new(Progress::new(cli.quiet))),
        )
    } else {
        Arc::clone(&log_sink)
    };

    let finder = DuplicateFinder::new(config.finder_config().with_progress_callback(sink));
    let result = finder.find_duplicates(&cli.paths);
    let (groups, summary) = match result {
        Ok(found) => found,
        Err(e) => {
            logging::flush();
            return Err(e).context("Scan failed");
        }
    };

    log_summary(&summary);
    let exit_code = ExitCode::for_scan(groups.len(), summary.has_errors());

    match cli.output {
        OutputFormat::Text => TextReport::new(&groups).emit(log_sink.as_ref()),
        OutputFormat::Json => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            JsonOutput::new(&groups, &summary, exit_code)
                .write_to(&mut handle, true)
                .context("Failed to write JSON report")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    log::info!("scan completed");
    logging::flush();
    Ok(exit_code)
}

fn log_summary(summary: &ScanSummary) {
    log::info!(
        "{} file(s) scanned ({}), {} below minimum size",
        summary.total_files,
        summary.total_size_display(),
        summary.below_min_size
    );
    log::info!(
        "eliminated by size = {}, by partial hash = {}, by full hash = {}",
        summary.eliminated_by_size,
        summary.eliminated_by_partial,
        summary.eliminated_by_full
    );
    log::info!(
        "{} duplicate group(s), {} reclaimable, finished in {:.2?}",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.scan_duration
    );
    if summary.has_errors() {
        log::warn!(
            "{} entr(ies) skipped because of errors",
            summary.scan_errors.len()
        );
    }
}
