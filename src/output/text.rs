//! Line-oriented duplicate report.
//!
//! The report is framed by start and end markers with one
//! `<group id>,<file name>,<parent directory>` line per member in between.
//! Lines are handed to a [`ProgressCallback`] so they land in the log with
//! the usual timestamp prefix.

use std::path::Path;

use crate::duplicates::DuplicateGroup;
use crate::progress::ProgressCallback;

/// First line of the report.
pub const START_MARKER: &str = "-- Start of duplicate file list --";
/// Last line of the report.
pub const END_MARKER: &str = "-- End of duplicate file list --";

/// Text report over a set of duplicate groups.
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> TextReport<'a> {
    /// Create a report over `groups`, in the order given.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// All report lines, markers included.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let members: usize = self.groups.iter().map(DuplicateGroup::len).sum();
        let mut lines = Vec::with_capacity(members + 2);

        lines.push(START_MARKER.to_string());
        for group in self.groups {
            let id = group.id();
            for path in &group.files {
                lines.push(member_line(&id, path));
            }
        }
        lines.push(END_MARKER.to_string());
        lines
    }

    /// Send every line to `sink`.
    pub fn emit(&self, sink: &dyn ProgressCallback) {
        for line in self.lines() {
            sink.on_message(&line);
        }
    }
}

fn member_line(id: &str, path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy())
        .unwrap_or_default();
    format!("{id},{name},{dir}")
}
