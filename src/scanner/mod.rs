//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sequential directory walking over several roots using walkdir
//! - Symlink resolution to real paths
//! - Partial and full content hashing with SHA-1
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-1 file hashing (partial prefix or streaming full)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("/srv/photos"), PathBuf::from("/mnt/backup")];
//! let walker = Walker::new(&roots, WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{
    hash_to_hex, Digest, HashMode, Hasher, CHUNK_SIZE, MAX_BUFFER_SIZE, PARTIAL_SIZE,
};
pub use walker::Walker;

/// A discovered regular file.
///
/// The path is absolute and symlink-free. Two entries may carry the same
/// path when one physical file is reachable from several roots or links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Real (canonical) path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Descend into directories reached through symbolic links.
    /// Warning: May revisit trees when links form cycles (walkdir reports these).
    pub follow_dir_symlinks: bool,

    /// Report progress every this many discovered files.
    pub progress_interval: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_dir_symlinks: false,
            progress_interval: 1000,
        }
    }
}

impl WalkerConfig {
    /// Set the progress reporting cadence (clamped to at least 1).
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Descend into symlinked directories.
    #[must_use]
    pub fn with_follow_dir_symlinks(mut self, follow: bool) -> Self {
        self.follow_dir_symlinks = follow;
        self
    }
}

/// Errors that can occur during directory scanning.
///
/// Everything except [`ScanError::InvalidRoot`] is recoverable: the entry is
/// skipped and the scan continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished or is a dangling link.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A symlinked directory points back into its own ancestry.
    #[error("Filesystem loop at {0}")]
    Loop(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A scan root does not exist or is not a directory.
    #[error("Invalid scan root {path}: {reason}")]
    InvalidRoot {
        /// The rejected root
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// A candidate file could not be hashed.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Whether the scan can skip the failing entry and carry on.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidRoot { .. })
    }

    /// Build a scan error from an I/O error, classified by kind.
    pub(crate) fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// The file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
