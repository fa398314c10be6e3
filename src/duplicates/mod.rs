//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (stage 1)
//! - Partial hash regrouping (stage 2)
//! - Full hash regrouping (stage 3)
//! - Duplicate group extraction

pub mod finder;
pub mod groups;

pub use finder::{
    extract_duplicates, regroup, DuplicateFinder, FinderConfig, FinderError, RegroupConfig,
    RegroupStats, ScanSummary, MIN_FILE_SIZE,
};
pub use groups::{group_by_size, DuplicateGroup, FileGroups, GroupKey, GroupingStats};
