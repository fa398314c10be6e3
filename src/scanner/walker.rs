//! Directory walker over one or more scan roots.
//!
//! # Overview
//!
//! [`Walker`] visits every descendant directory of each root in order and
//! yields one [`FileEntry`] per regular file, with the path resolved to its
//! real, symlink-free form. Traversal uses [`walkdir`] single-threaded so
//! results come out in a deterministic order (entries sorted by name).
//!
//! Failures on individual entries (permission denied, dangling symlink, file
//! removed mid-scan) are yielded as [`ScanError`] values and never stop the
//! iteration.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from(".")];
//! let walker = Walker::new(&roots, WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for sequential file discovery.
pub struct Walker {
    /// Roots to walk, in order
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional sink for periodic file counts
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("roots", &self.roots)
            .field("config", &self.config)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given roots.
    #[must_use]
    pub fn new(roots: &[PathBuf], config: WalkerConfig) -> Self {
        Self {
            roots: roots.to_vec(),
            config,
            progress: None,
        }
    }

    /// Report a running file count every `progress_interval` files.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Check that a root can be walked.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRoot`] if the path does not exist or is not
    /// a directory.
    pub fn validate_root(root: &Path) -> Result<(), ScanError> {
        match std::fs::metadata(root) {
            Ok(m) if m.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::InvalidRoot {
                path: root.to_path_buf(),
                reason: "not a directory".to_string(),
            }),
            Err(e) => Err(ScanError::InvalidRoot {
                path: root.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    /// Walk every root, yielding file entries.
    ///
    /// Returns a lazy iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let interval = self.config.progress_interval.max(1);
        let mut discovered = 0usize;

        self.roots
            .iter()
            .flat_map(move |root| {
                log::debug!("Walking root {}", root.display());
                WalkDir::new(root)
                    .follow_links(self.config.follow_dir_symlinks)
                    .sort_by_file_name()
                    .into_iter()
            })
            .filter_map(move |entry_result| {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(Self::handle_walkdir_error(e))),
                };

                if entry.file_type().is_dir() {
                    return None;
                }

                let result = Self::resolve_entry(entry.path())?;
                if let Ok(ref file) = result {
                    discovered += 1;
                    if discovered % interval == 0 {
                        if let Some(ref progress) = self.progress {
                            progress.on_progress(discovered, &file.path.to_string_lossy());
                        }
                    }
                }
                Some(result)
            })
    }

    /// Resolve a candidate to its real path and size.
    ///
    /// Returns `None` for entries that are not regular files once resolved
    /// (symlinked directories, sockets, fifos).
    fn resolve_entry(path: &Path) -> Option<Result<FileEntry, ScanError>> {
        let real_path = match std::fs::canonicalize(path) {
            Ok(p) => p,
            Err(e) => return Some(Err(Self::handle_io_error(path, e, "resolve"))),
        };

        let metadata = match std::fs::metadata(&real_path) {
            Ok(m) => m,
            Err(e) => return Some(Err(Self::handle_io_error(&real_path, e, "stat"))),
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular entry: {}", path.display());
            return None;
        }

        if real_path != path {
            log::trace!("Resolved {} -> {}", path.display(), real_path.display());
        }

        Some(Ok(FileEntry::new(real_path, metadata.len())))
    }

    /// Log and classify an I/O error on a single entry.
    fn handle_io_error(path: &Path, error: std::io::Error, operation: &str) -> ScanError {
        let err = ScanError::from_io(path.to_path_buf(), error);
        if let ScanError::NotFound(_) = err {
            log::debug!(
                "Skipping {} ({} failed, dangling or removed)",
                path.display(),
                operation
            );
        } else {
            log::warn!("Skipping {} ({} failed): {}", path.display(), operation, err);
        }
        err
    }

    /// Log and classify a traversal error (unreadable directory, loop).
    fn handle_walkdir_error(error: walkdir::Error) -> ScanError {
        let path = error.path().map(Path::to_path_buf).unwrap_or_default();

        if let Some(ancestor) = error.loop_ancestor() {
            log::warn!(
                "Filesystem loop: {} points to {}",
                path.display(),
                ancestor.display()
            );
            return ScanError::Loop(path);
        }

        log::warn!("Walker error for {}: {}", path.display(), error);
        match error.into_io_error() {
            Some(io) => ScanError::from_io(path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("directory traversal failed"),
            },
        }
    }
}
