//! Group keys, ordered file groups and size-based grouping.
//!
//! # Overview
//!
//! Every stage of the pipeline produces a [`FileGroups`]: an insertion-ordered
//! mapping from a [`GroupKey`] to the paths that share it. The key starts as a
//! bare size and gains one digest per refinement stage:
//!
//! ```text
//! size  ->  size + partial  ->  size + partial + full
//! ```
//!
//! Size is always the root of the lineage, so files of different sizes can
//! never meet in one group no matter how their hashes compare.
//!
//! ## Size Grouping
//!
//! [`group_by_size`] is the first stage. It drops files below the minimum
//! size and buckets the rest by exact byte size. Singleton buckets are kept;
//! they are filtered on entry to the first refinement.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::FileEntry;
//! use dupescan::duplicates::{group_by_size, GroupKey};
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.bin"), 4096),
//!     FileEntry::new(PathBuf::from("/file2.bin"), 4096),
//!     FileEntry::new(PathBuf::from("/file3.bin"), 8192),
//!     FileEntry::new(PathBuf::from("/tiny.txt"), 12),
//! ];
//!
//! let (groups, stats) = group_by_size(files, 2000);
//!
//! assert_eq!(stats.total_files, 4);
//! assert_eq!(stats.below_min_size, 1);
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups.get(&GroupKey::from_size(4096)).unwrap().len(), 2);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, Digest, FileEntry, HashMode};

/// Composite key identifying the refinement path a file passed through.
///
/// Compared and hashed structurally. Ordering sorts by size first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    /// File size in bytes
    pub size: u64,
    /// Digest of the leading bytes, once computed
    pub partial: Option<Digest>,
    /// Digest of the whole file, once computed
    pub full: Option<Digest>,
}

impl GroupKey {
    /// Root key for a size bucket.
    #[must_use]
    pub fn from_size(size: u64) -> Self {
        Self {
            size,
            partial: None,
            full: None,
        }
    }

    /// Extend this key with a digest computed in `mode`.
    #[must_use]
    pub fn with_digest(self, mode: HashMode, digest: Digest) -> Self {
        match mode {
            HashMode::Partial => Self {
                partial: Some(digest),
                ..self
            },
            HashMode::Full => Self {
                full: Some(digest),
                ..self
            },
        }
    }

    /// Stable textual identifier: `size[-partial[-full]]` with hex digests.
    #[must_use]
    pub fn id(&self) -> String {
        let mut id = self.size.to_string();
        for digest in [self.partial, self.full].iter().flatten() {
            id.push('-');
            id.push_str(&hash_to_hex(digest));
        }
        id
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

/// Insertion-ordered mapping from [`GroupKey`] to file paths.
///
/// Keys iterate in the order they were first inserted and each member list
/// keeps its insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileGroups {
    order: Vec<GroupKey>,
    members: HashMap<GroupKey, Vec<PathBuf>>,
}

impl FileGroups {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path to the group for `key`, creating it if needed.
    pub fn push(&mut self, key: GroupKey, path: PathBuf) {
        let order = &mut self.order;
        self.members
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(path);
    }

    /// Members of the group for `key`.
    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&[PathBuf]> {
        self.members.get(key).map(Vec::as_slice)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of paths across all groups.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.members.values().map(Vec::len).sum()
    }

    /// Number of paths in groups with two or more members.
    #[must_use]
    pub fn candidate_files(&self) -> usize {
        self.members
            .values()
            .filter(|files| files.len() > 1)
            .map(Vec::len)
            .sum()
    }

    /// Iterate groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[PathBuf])> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.members.get(key).map(|files| (key, files.as_slice())))
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> &[GroupKey] {
        &self.order
    }
}

impl IntoIterator for FileGroups {
    type Item = (GroupKey, Vec<PathBuf>);
    type IntoIter = std::vec::IntoIter<(GroupKey, Vec<PathBuf>)>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.order
            .into_iter()
            .filter_map(|key| self.members.remove(&key).map(|files| (key, files)))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl FromIterator<(GroupKey, PathBuf)> for FileGroups {
    fn from_iter<I: IntoIterator<Item = (GroupKey, PathBuf)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (key, path) in iter {
            groups.push(key, path);
        }
        groups
    }
}

/// Confirmed duplicate group of files.
///
/// Every member has the same size and the same full-content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Full key lineage (size, partial digest, full digest)
    pub key: GroupKey,
    /// Real paths of the identical files, in discovery order
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(key: GroupKey, files: Vec<PathBuf>) -> Self {
        Self { key, files }
    }

    /// Stable group identifier (see [`GroupKey::id`]).
    #[must_use]
    pub fn id(&self) -> String {
        self.key.id()
    }

    /// File size in bytes (shared by all members).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.key.size
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space held by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.key.size * self.duplicate_count() as u64
    }

    /// Full-content digest as hexadecimal, if present.
    #[must_use]
    pub fn full_hash_hex(&self) -> Option<String> {
        self.key.full.as_ref().map(hash_to_hex)
    }
}

/// Statistics from the size grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files seen
    pub total_files: usize,
    /// Total size of all files seen, in bytes
    pub total_size: u64,
    /// Files discarded for being smaller than the minimum size
    pub below_min_size: usize,
    /// Files kept in a size bucket
    pub kept_files: usize,
    /// Number of distinct sizes among kept files
    pub unique_sizes: usize,
    /// Size buckets holding a single file
    pub singleton_sizes: usize,
}

impl GroupingStats {
    /// Percentage of kept files that sit alone in their size bucket.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.kept_files == 0 {
            0.0
        } else {
            (self.singleton_sizes as f64 / self.kept_files as f64) * 100.0
        }
    }
}

/// Group files by exact size.
///
/// Files strictly smaller than `min_size` are discarded. Every other file is
/// appended to the bucket for its size, in the order encountered. Buckets with
/// a single file are kept.
///
/// # Performance
///
/// - Time complexity: O(n) where n is the number of files
/// - No file I/O is performed (metadata only)
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
    min_size: u64,
) -> (FileGroups, GroupingStats) {
    let mut groups = FileGroups::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        if file.size < min_size {
            stats.below_min_size += 1;
            log::trace!(
                "Below minimum size ({} < {}): {}",
                file.size,
                min_size,
                file.path.display()
            );
            continue;
        }

        stats.kept_files += 1;
        groups.push(GroupKey::from_size(file.size), file.path);
    }

    stats.unique_sizes = groups.len();
    stats.singleton_sizes = groups.iter().filter(|(_, files)| files.len() == 1).count();

    log::debug!(
        "Size grouping: {} files, {} below {} bytes, {} distinct sizes ({} singletons)",
        stats.total_files,
        stats.below_min_size,
        min_size,
        stats.unique_sizes,
        stats.singleton_sizes
    );

    (groups, stats)
}
