//! Duplicate finder implementation with progressive refinement.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk + size grouping**: enumerate files and bucket them by size
//!    (see [`crate::duplicates::groups`])
//! 2. **Partial regroup**: hash the first 64 KiB of files sharing a size
//! 3. **Full regroup**: hash the whole content of files sharing a partial key
//! 4. **Extract**: keep only groups with two or more members
//!
//! Each refinement only looks at groups with at least two members, so a file
//! with a unique size is never opened and a file with a unique prefix is never
//! read to the end.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{extract_duplicates, group_by_size, regroup, RegroupConfig};
//! use dupescan::scanner::{HashMode, Hasher, Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from(".")];
//! let walker = Walker::new(&roots, WalkerConfig::default());
//! let (by_size, _) = group_by_size(walker.walk().filter_map(Result::ok), 2000);
//!
//! let hasher = Hasher::new();
//! let config = RegroupConfig::default();
//! let (by_partial, _) = regroup(by_size, &hasher, HashMode::Partial, &config);
//! let (by_full, _) = regroup(by_partial, &hasher, HashMode::Full, &config);
//!
//! for group in extract_duplicates(by_full) {
//!     println!("{}: {:?}", group.id(), group.files);
//! }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_size, DuplicateGroup, FileGroups, GroupKey};
use crate::progress::{ProgressCallback, PHASE_FULL, PHASE_PARTIAL, PHASE_WALK};
use crate::scanner::{
    Digest, FileEntry, HashError, HashMode, Hasher, ScanError, Walker, WalkerConfig,
};

/// Files smaller than this many bytes are ignored by default.
pub const MIN_FILE_SIZE: u64 = 2000;

/// Configuration for one regrouping stage.
#[derive(Clone)]
pub struct RegroupConfig {
    /// Number of threads hashing within the stage. 1 hashes sequentially.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for RegroupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegroupConfig")
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for RegroupConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            progress_callback: None,
        }
    }
}

impl RegroupConfig {
    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics from one regrouping stage.
#[derive(Debug, Default)]
pub struct RegroupStats {
    /// Which digest this stage computed
    pub mode: Option<HashMode>,
    /// Groups dropped on entry because they held a single file
    pub skipped_singletons: usize,
    /// Files that entered hashing
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Errors for the files that could not be read
    pub errors: Vec<HashError>,
    /// Groups produced, singletons included
    pub output_groups: usize,
    /// Files left in groups of two or more
    pub potential_duplicates: usize,
}

impl RegroupStats {
    /// Percentage of hashed files that ended up alone in their new group.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.hashed_files == 0 {
            0.0
        } else {
            let eliminated = self.hashed_files - self.potential_duplicates;
            (eliminated as f64 / self.hashed_files as f64) * 100.0
        }
    }
}

/// Refine every group by appending a digest to its key.
///
/// Groups with fewer than two members are dropped before any hashing. Each
/// remaining member is hashed in `mode` and filed under
/// `(old key, digest)`, keeping insertion order. Groups of one in the output
/// are retained; they fall out at the next stage or at extraction.
///
/// A member that cannot be hashed is logged, recorded in the stats and left
/// out of the result. It never aborts the stage.
///
/// With `io_threads > 1` the members are hashed on a rayon pool. Results are
/// gathered in input order, so the output is the same as a sequential run.
#[must_use]
pub fn regroup(
    groups: FileGroups,
    hasher: &Hasher,
    mode: HashMode,
    config: &RegroupConfig,
) -> (FileGroups, RegroupStats) {
    let mut stats = RegroupStats {
        mode: Some(mode),
        ..Default::default()
    };
    let phase = match mode {
        HashMode::Partial => PHASE_PARTIAL,
        HashMode::Full => PHASE_FULL,
    };

    let mut work: Vec<(GroupKey, PathBuf)> = Vec::new();
    for (key, files) in groups {
        if files.len() < 2 {
            stats.skipped_singletons += 1;
            if let Some(only) = files.first() {
                log::trace!("No possible duplicate for {}: {}", key, only.display());
            }
            continue;
        }
        work.extend(files.into_iter().map(|path| (key, path)));
    }
    stats.input_files = work.len();

    let progress = config.progress_callback.as_deref();
    if let Some(p) = progress {
        p.on_phase_start(phase, work.len());
    }

    let processed = AtomicUsize::new(0);
    let hash_one = |(key, path): &(GroupKey, PathBuf)| -> Result<Digest, HashError> {
        let result = hasher.hash(path, mode);
        let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(p) = progress {
            p.on_progress(current, &path.to_string_lossy());
            if result.is_ok() {
                p.on_item_completed(key.size);
            }
        }
        result
    };

    let digests: Vec<Result<Digest, HashError>> = match build_pool(config.io_threads) {
        Some(pool) => pool.install(|| work.par_iter().map(hash_one).collect()),
        None => work.iter().map(hash_one).collect(),
    };

    let mut refined = FileGroups::new();
    for ((key, path), result) in work.into_iter().zip(digests) {
        match result {
            Ok(digest) => {
                stats.hashed_files += 1;
                refined.push(key.with_digest(mode, digest), path);
            }
            Err(e) => {
                log::warn!("Skipping {} ({} hash failed): {}", path.display(), mode, e);
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    stats.output_groups = refined.len();
    stats.potential_duplicates = refined.candidate_files();

    if let Some(p) = progress {
        p.on_phase_end(phase);
    }
    log::debug!(
        "{} regroup: {} files in, {} hashed, {} failed, {} groups out ({:.1}% eliminated)",
        mode,
        stats.input_files,
        stats.hashed_files,
        stats.failed_files,
        stats.output_groups,
        stats.elimination_rate()
    );

    (refined, stats)
}

/// Build a dedicated hashing pool, or `None` to hash on the calling thread.
fn build_pool(io_threads: usize) -> Option<rayon::ThreadPool> {
    if io_threads <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(io_threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Failed to build hashing pool, hashing sequentially: {}", e);
            None
        }
    }
}

/// Keep only groups with two or more members.
///
/// Given a fully refined mapping, every member of a returned group has the
/// same size and the same full-content digest as every other member.
#[must_use]
pub fn extract_duplicates(groups: FileGroups) -> Vec<DuplicateGroup> {
    groups
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(key, files)| DuplicateGroup::new(key, files))
        .collect()
}

/// Configuration for the whole pipeline.
#[derive(Clone)]
pub struct FinderConfig {
    /// Files strictly smaller than this are ignored.
    pub min_size: u64,
    /// Leading bytes covered by the partial hash.
    pub partial_size: usize,
    /// Read buffer size for full hashing.
    pub chunk_size: usize,
    /// Number of hashing threads within a stage.
    pub io_threads: usize,
    /// Directory walking options.
    pub walker_config: WalkerConfig,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("min_size", &self.min_size)
            .field("partial_size", &self.partial_size)
            .field("chunk_size", &self.chunk_size)
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            min_size: MIN_FILE_SIZE,
            partial_size: crate::scanner::PARTIAL_SIZE,
            chunk_size: crate::scanner::CHUNK_SIZE,
            io_threads: 1,
            walker_config: WalkerConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_size = bytes;
        self
    }

    /// Set the partial hash length.
    #[must_use]
    pub fn with_partial_size(mut self, bytes: usize) -> Self {
        self.partial_size = bytes.max(1);
        self
    }

    /// Set the full hash read buffer size.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn regroup_config(&self) -> RegroupConfig {
        RegroupConfig {
            io_threads: self.io_threads,
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary of a complete scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Files ignored for being below the minimum size
    pub below_min_size: usize,
    /// Files eliminated because no other file had their size
    pub eliminated_by_size: usize,
    /// Files eliminated because no other file had their leading bytes
    pub eliminated_by_partial: usize,
    /// Files eliminated because no other file had their full content
    pub eliminated_by_full: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Recoverable errors encountered (skipped entries and unreadable files)
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any entry had to be skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that abort a scan before any work is done.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No roots were given.
    #[error("No paths to scan")]
    NoRoots,

    /// None of the given roots can be walked.
    #[error("No valid paths to scan: {}", format_paths(.0))]
    NoValidRoots(Vec<PathBuf>),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Duplicate finder that runs the complete pipeline.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(4096));
/// let (groups, summary) = finder.find_duplicates(&[PathBuf::from("/data")]).unwrap();
///
/// println!("Found {} duplicate groups", groups.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new()
            .with_partial_size(config.partial_size)
            .with_chunk_size(config.chunk_size);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    fn notify(&self, message: &str) {
        match self.config.progress_callback {
            Some(ref p) => p.on_message(message),
            None => log::debug!("{}", message),
        }
    }

    /// Find all duplicate files under the given roots.
    ///
    /// Roots that do not exist or are not directories are logged and skipped.
    /// Unreadable entries and files that fail to hash are skipped and
    /// collected in [`ScanSummary::scan_errors`].
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::NoRoots`] for an empty list and
    /// [`FinderError::NoValidRoots`] when no root can be walked. Nothing is
    /// scanned in either case.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if roots.is_empty() {
            return Err(FinderError::NoRoots);
        }

        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let mut valid_roots = Vec::with_capacity(roots.len());
        for root in roots {
            match Walker::validate_root(root) {
                Ok(()) => valid_roots.push(root.clone()),
                Err(e) => {
                    log::warn!("{}", e);
                    summary.scan_errors.push(e);
                }
            }
        }
        if valid_roots.is_empty() {
            return Err(FinderError::NoValidRoots(roots.to_vec()));
        }

        self.notify(&format!("scan starting: {} root(s)", valid_roots.len()));

        let mut walker = Walker::new(&valid_roots, self.config.walker_config.clone());
        if let Some(ref p) = self.config.progress_callback {
            walker = walker.with_progress(Arc::clone(p));
            p.on_phase_start(PHASE_WALK, 0);
        }

        let mut walk_errors = Vec::new();
        let files = walker.walk().filter_map(|result| match result {
            Ok(file) => Some(file),
            Err(e) => {
                walk_errors.push(e);
                None
            }
        });
        let (size_groups, size_stats) = group_by_size(files, self.config.min_size);

        if let Some(ref p) = self.config.progress_callback {
            p.on_phase_end(PHASE_WALK);
        }
        summary.scan_errors.extend(walk_errors);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.below_min_size = size_stats.below_min_size;
        summary.eliminated_by_size = size_stats.singleton_sizes;

        self.notify(&format!("records processed = {}", size_stats.kept_files));

        let groups = self.refine(size_groups, &mut summary);
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }

    /// Run the pipeline over an already collected file list.
    ///
    /// Useful when files come from somewhere other than a directory walk.
    /// The minimum size filter still applies.
    pub fn find_duplicates_from_files(
        &self,
        files: impl IntoIterator<Item = FileEntry>,
    ) -> (Vec<DuplicateGroup>, ScanSummary) {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let (size_groups, size_stats) = group_by_size(files, self.config.min_size);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.below_min_size = size_stats.below_min_size;
        summary.eliminated_by_size = size_stats.singleton_sizes;

        self.notify(&format!("records processed = {}", size_stats.kept_files));

        let groups = self.refine(size_groups, &mut summary);
        summary.scan_duration = start_time.elapsed();
        (groups, summary)
    }

    /// Partial regroup, full regroup, extraction.
    fn refine(&self, size_groups: FileGroups, summary: &mut ScanSummary) -> Vec<DuplicateGroup> {
        let regroup_config = self.config.regroup_config();

        let (by_partial, partial_stats) =
            regroup(size_groups, &self.hasher, HashMode::Partial, &regroup_config);
        summary.eliminated_by_partial =
            partial_stats.hashed_files - partial_stats.potential_duplicates;

        let (by_full, full_stats) =
            regroup(by_partial, &self.hasher, HashMode::Full, &regroup_config);

        let duplicates = extract_duplicates(by_full);
        let in_groups: usize = duplicates.iter().map(DuplicateGroup::len).sum();
        summary.eliminated_by_full = full_stats.hashed_files - in_groups;

        summary.duplicate_groups = duplicates.len();
        summary.duplicate_files = duplicates.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = duplicates.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_errors.extend(
            partial_stats
                .errors
                .into_iter()
                .chain(full_stats.errors)
                .map(ScanError::from),
        );

        self.notify(&format!(
            "duplicate files identified: {} group(s), {} redundant file(s)",
            summary.duplicate_groups, summary.duplicate_files
        ));

        duplicates
    }
}
