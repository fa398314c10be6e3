//! SHA-1 file hasher with partial and streaming modes.
//!
//! # Overview
//!
//! [`Hasher`] produces a [`Digest`] for a file in one of two modes:
//!
//! - [`HashMode::Partial`]: hash only the first [`PARTIAL_SIZE`] bytes. Cheap
//!   fingerprint that separates most same-size files without reading them whole.
//! - [`HashMode::Full`]: stream the entire file in [`CHUNK_SIZE`] chunks. This is
//!   the authoritative comparison.
//!
//! Each call opens, reads and closes the file before returning.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{hash_to_hex, HashMode, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.hash(Path::new("photo.jpg"), HashMode::Full).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha1::{Digest as _, Sha1};

use super::HashError;

/// SHA-1 digest (20 bytes).
pub type Digest = [u8; 20];

/// Bytes read from the start of a file for a partial hash (64 KiB).
pub const PARTIAL_SIZE: usize = 64 * 1024;

/// Read buffer size used when streaming a full hash (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Upper bound for the partial hash length and the full hash read buffer (1 GiB).
pub const MAX_BUFFER_SIZE: usize = 1 << 30;

/// Which part of the file a digest covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashMode {
    /// Leading bytes only
    Partial,
    /// Entire content
    Full,
}

impl std::fmt::Display for HashMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashMode::Partial => write!(f, "partial"),
            HashMode::Full => write!(f, "full"),
        }
    }
}

/// File hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    partial_size: usize,
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default partial and chunk sizes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            partial_size: PARTIAL_SIZE,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Override the number of leading bytes covered by a partial hash.
    ///
    /// Clamped to `1..=MAX_BUFFER_SIZE`.
    #[must_use]
    pub fn with_partial_size(mut self, size: usize) -> Self {
        self.partial_size = size.clamp(1, MAX_BUFFER_SIZE);
        self
    }

    /// Override the read buffer size for full hashing.
    ///
    /// Clamped to `1..=MAX_BUFFER_SIZE`.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.clamp(1, MAX_BUFFER_SIZE);
        self
    }

    /// Bytes covered by a partial hash.
    #[must_use]
    pub fn partial_size(&self) -> usize {
        self.partial_size
    }

    /// Compute the digest of `path` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn hash(&self, path: &Path, mode: HashMode) -> Result<Digest, HashError> {
        match mode {
            HashMode::Partial => self.partial_hash(path),
            HashMode::Full => self.full_hash(path),
        }
    }

    /// Hash the first `partial_size` bytes of a file.
    ///
    /// Files shorter than the limit are hashed whole, so for them the partial
    /// and full digests are equal.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn partial_hash(&self, path: &Path) -> Result<Digest, HashError> {
        log::debug!("Partial hashing {}", path.display());
        let file = open(path)?;

        let mut buffer = Vec::new();
        file.take(self.partial_size as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| map_io_error(path, e))?;

        let mut sha = Sha1::new();
        sha.update(&buffer);
        log::trace!("1 chunk hashed ({} bytes)", buffer.len());
        Ok(sha.finalize().into())
    }

    /// Hash the entire content of a file, streaming in fixed-size chunks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        log::debug!("Full hashing {}", path.display());
        let mut file = open(path)?;

        let mut sha = Sha1::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut chunks = 0usize;
        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(path, e)),
            };
            sha.update(&buffer[..n]);
            chunks += 1;
        }

        log::trace!("{} chunks hashed", chunks);
        Ok(sha.finalize().into())
    }
}

fn open(path: &Path) -> Result<File, HashError> {
    File::open(path).map_err(|e| map_io_error(path, e))
}

fn map_io_error(path: &Path, error: io::Error) -> HashError {
    match error.kind() {
        io::ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Format a digest as lowercase hexadecimal (40 characters).
#[must_use]
pub fn hash_to_hex(digest: &Digest) -> String {
    use std::fmt::Write;

    digest.iter().fold(String::with_capacity(40), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
