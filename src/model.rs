use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::CommitStatistics;

pub const SCHEMA_VERSION: u32 = 2;

/// Path value that marks the side of a change on which the file did not exist.
pub const NO_FILE_NAME: &str = "/dev/null";

/// How a file's path changed within one revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PathChange {
    Add,
    Delete,
    Rename,
    Modify,
}

impl PathChange {
    /// Classifies a path transition. `None` means the file is absent on that side.
    pub fn classify(old_path: Option<&str>, new_path: Option<&str>) -> Self {
        match (old_path, new_path) {
            (None, Some(_)) => PathChange::Add,
            (Some(_), None) => PathChange::Delete,
            (Some(old), Some(new)) if old != new => PathChange::Rename,
            _ => PathChange::Modify,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PathChange::Add => "ADD",
            PathChange::Delete => "DELETE",
            PathChange::Rename => "RENAME",
            PathChange::Modify => "MODIFY",
        }
    }
}

impl std::fmt::Display for PathChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One file touched by one revision.
///
/// Line counts are accumulated hunk by hunk while mining; once the record is
/// handed to the statistics types it is only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    revision_id: String,
    author: String,
    time: i64,
    added_lines: u32,
    deleted_lines: u32,
    old_path: Option<String>,
    new_path: Option<String>,
}

impl Commit {
    pub fn new(revision_id: impl Into<String>, author: impl Into<String>, time: i64) -> Self {
        Self {
            revision_id: revision_id.into(),
            author: author.into(),
            time,
            added_lines: 0,
            deleted_lines: 0,
            old_path: None,
            new_path: None,
        }
    }

    pub fn add_lines(&mut self, lines: u32) -> &mut Self {
        self.added_lines = self.added_lines.saturating_add(lines);
        self
    }

    pub fn delete_lines(&mut self, lines: u32) -> &mut Self {
        self.deleted_lines = self.deleted_lines.saturating_add(lines);
        self
    }

    pub fn set_old_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.old_path = existing_path(path.into());
        self
    }

    pub fn set_new_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.new_path = existing_path(path.into());
        self
    }

    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn added_lines(&self) -> u32 {
        self.added_lines
    }

    pub fn deleted_lines(&self) -> u32 {
        self.deleted_lines
    }

    pub fn old_path(&self) -> Option<&str> {
        self.old_path.as_deref()
    }

    pub fn new_path(&self) -> Option<&str> {
        self.new_path.as_deref()
    }

    /// The name the file is known by after this change.
    pub fn file_name(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or(NO_FILE_NAME)
    }

    pub fn change(&self) -> PathChange {
        PathChange::classify(self.old_path(), self.new_path())
    }

    pub fn is_add(&self) -> bool {
        self.change() == PathChange::Add
    }

    pub fn is_delete(&self) -> bool {
        self.change() == PathChange::Delete
    }

    pub fn is_move(&self) -> bool {
        self.change() == PathChange::Rename
    }

    pub fn is_modify(&self) -> bool {
        self.change() == PathChange::Modify
    }
}

fn existing_path(path: String) -> Option<String> {
    if path == NO_FILE_NAME {
        None
    } else {
        Some(path)
    }
}

/// Revision metadata reported by the miner before any diff is computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionInfo {
    pub id: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub parent_ids: Vec<String>,
}

/// A mined record plus whether either side of the change was a binary blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedChange {
    pub commit: Commit,
    pub is_binary: bool,
}

impl MinedChange {
    pub fn text(commit: Commit) -> Self {
        Self { commit, is_binary: false }
    }

    pub fn binary(commit: Commit) -> Self {
        Self { commit, is_binary: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub file_count: usize,
    #[serde(flatten)]
    pub statistics: CommitStatistics,
    pub report: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub link: String,
    pub commit_count: usize,
    pub author_count: usize,
    pub added_lines: u64,
    pub deleted_lines: u64,
    pub lines_of_code: i64,
    pub absolute_churn: u64,
    pub created: i64,
    pub last_modified: i64,
    pub deleted: bool,
    pub old_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub entries: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub entries: Vec<Commit>,
}

#[derive(Debug, Clone)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
