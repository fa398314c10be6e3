//! Progress reporting for the duplicate detection pipeline.
//!
//! The pipeline never writes to a global destination on its own. Callers
//! inject a [`ProgressCallback`] through [`crate::duplicates::FinderConfig`] and
//! every milestone (scan start/complete, periodic counts, per-phase results)
//! goes through it.
//!
//! Implementations:
//! - [`LogProgress`]: renders milestones as `log` records (the default sink)
//! - [`Progress`]: indicatif progress bars for interactive terminals
//! - [`ProgressFanout`]: forwards every event to several sinks

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name used while walking directories.
pub const PHASE_WALK: &str = "walking";
/// Phase name used while computing partial hashes.
pub const PHASE_PARTIAL: &str = "partial-hash";
/// Phase name used while computing full hashes.
pub const PHASE_FULL: &str = "full-hash";

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (one of the `PHASE_*` constants)
    /// * `total` - Total number of items to process, 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called as items are processed.
    ///
    /// During the walk this fires every `progress_interval` files; during
    /// hashing it fires once per file.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called for free-form milestone messages.
    fn on_message(&self, _message: &str) {}
}

/// Progress sink that writes milestones through the `log` facade.
///
/// Walk counts and phase boundaries are logged at info level, individual
/// hashed files at debug level.
#[derive(Debug, Default)]
pub struct LogProgress {
    phase: Mutex<String>,
}

impl LogProgress {
    /// Create a new log-backed progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn current_phase(&self) -> String {
        self.phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressCallback for LogProgress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase.to_string();
        if total > 0 {
            log::info!("{} starting ({} files)", phase, total);
        } else {
            log::info!("{} starting", phase);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        let phase = self.current_phase();
        if phase == PHASE_WALK {
            log::info!("{} count = {}", phase, current);
        } else {
            log::debug!("{} {}: {}", phase, current, path);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        log::info!("{} complete", phase);
        self.phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn on_message(&self, message: &str) {
        log::info!("{}", message);
    }
}

/// Forwards every event to each wrapped sink in order.
#[derive(Default)]
pub struct ProgressFanout {
    sinks: Vec<Arc<dyn ProgressCallback>>,
}

impl ProgressFanout {
    /// Create an empty fanout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn ProgressCallback>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ProgressCallback for ProgressFanout {
    fn on_phase_start(&self, phase: &str, total: usize) {
        self.sinks.iter().for_each(|s| s.on_phase_start(phase, total));
    }

    fn on_progress(&self, current: usize, path: &str) {
        self.sinks.iter().for_each(|s| s.on_progress(current, path));
    }

    fn on_item_completed(&self, bytes: u64) {
        self.sinks.iter().for_each(|s| s.on_item_completed(bytes));
    }

    fn on_phase_end(&self, phase: &str) {
        self.sinks.iter().for_each(|s| s.on_phase_end(phase));
    }

    fn on_message(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.on_message(message));
    }
}

/// Progress reporter using indicatif.
///
/// Shows a spinner while walking and a bar for each hashing phase.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupescan::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        if phase == PHASE_WALK {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::walking_style());
            pb.set_message("Walking directories");
            pb.enable_steady_tick(Duration::from_millis(100));
            *self.walking.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
        } else {
            let pb = self.multi.add(ProgressBar::new(total as u64));
            pb.set_style(Self::hashing_style());
            pb.set_message(phase.to_string());
            *self.hashing.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.hashing.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        } else if let Some(ref pb) = *self.walking.lock().unwrap_or_else(PoisonError::into_inner)
        {
            pb.set_position(current as u64);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let slot = if phase == PHASE_WALK {
            &self.walking
        } else {
            &self.hashing
        };
        if let Some(pb) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pb.finish_with_message(format!("{} complete", phase));
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
