use crate::error::{ForensicsError, Result};
use crate::link::{file_hash, file_link};
use crate::model::{Commit, PathChange};
use std::collections::{HashMap, HashSet};

/// Changes recorded for one commit id of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CommitChanges {
    added_lines: u64,
    deleted_lines: u64,
    author: String,
}

/// Per-file history: which commits touched the file and how many lines each
/// of them added and deleted.
///
/// Only [`RepositoryStatistics`](super::RepositoryStatistics) creates these.
#[derive(Debug, Clone)]
pub struct FileStatistics {
    file_name: String,
    commits: Vec<String>,
    changes: HashMap<String, CommitChanges>,
    creation_time: i64,
    last_modification_time: i64,
    latest_change: Option<(i64, PathChange)>,
    old_names: Vec<String>,
}

impl FileStatistics {
    pub(crate) fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            commits: Vec::new(),
            changes: HashMap::new(),
            creation_time: i64::MAX,
            last_modification_time: i64::MIN,
            latest_change: None,
            old_names: Vec::new(),
        }
    }

    /// Folds one commit into this file. Repeated commit ids keep their first
    /// position and accumulate their line counts.
    pub fn accept(&mut self, commit: &Commit) {
        let revision = commit.revision_id();
        if !self.changes.contains_key(revision) {
            self.commits.push(revision.to_string());
        }
        let entry = self.changes.entry(revision.to_string()).or_default();
        entry.added_lines += u64::from(commit.added_lines());
        entry.deleted_lines += u64::from(commit.deleted_lines());
        entry.author = commit.author().to_string();

        let time = commit.time();
        self.creation_time = self.creation_time.min(time);
        self.last_modification_time = self.last_modification_time.max(time);

        let change = commit.change();
        if self.latest_change.map_or(true, |(latest, _)| time >= latest) {
            self.latest_change = Some((time, change));
        }

        if change == PathChange::Rename {
            if let Some(old) = commit.old_path() {
                if !self.old_names.iter().any(|name| name == old) {
                    self.old_names.push(old.to_string());
                }
            }
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn hash(&self) -> i32 {
        file_hash(&self.file_name)
    }

    pub fn link(&self) -> String {
        file_link(&self.file_name)
    }

    /// Commit ids in the order they were first seen.
    pub fn commits(&self) -> &[String] {
        &self.commits
    }

    pub fn added_lines(&self, commit_id: &str) -> Result<u64> {
        self.lookup(commit_id).map(|c| c.added_lines)
    }

    pub fn deleted_lines(&self, commit_id: &str) -> Result<u64> {
        self.lookup(commit_id).map(|c| c.deleted_lines)
    }

    pub fn author(&self, commit_id: &str) -> Result<&str> {
        self.lookup(commit_id).map(|c| c.author.as_str())
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    pub fn author_count(&self) -> usize {
        self.changes
            .values()
            .map(|c| c.author.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn total_added_lines(&self) -> u64 {
        self.changes.values().map(|c| c.added_lines).sum()
    }

    pub fn total_deleted_lines(&self) -> u64 {
        self.changes.values().map(|c| c.deleted_lines).sum()
    }

    pub fn lines_of_code(&self) -> i64 {
        self.total_added_lines() as i64 - self.total_deleted_lines() as i64
    }

    pub fn absolute_churn(&self) -> u64 {
        self.total_added_lines() + self.total_deleted_lines()
    }

    /// Time of the oldest commit seen, or 0 for a file without commits.
    pub fn creation_time(&self) -> i64 {
        if self.commits.is_empty() {
            0
        } else {
            self.creation_time
        }
    }

    pub fn last_modification_time(&self) -> i64 {
        if self.commits.is_empty() {
            0
        } else {
            self.last_modification_time
        }
    }

    /// True when the most recent change removed the file.
    pub fn is_deleted(&self) -> bool {
        matches!(self.latest_change, Some((_, PathChange::Delete)))
    }

    /// Paths this file was renamed or moved from, in first-seen order.
    pub fn old_names(&self) -> &[String] {
        &self.old_names
    }

    fn lookup(&self, commit_id: &str) -> Result<&CommitChanges> {
        self.changes
            .get(commit_id)
            .ok_or_else(|| ForensicsError::CommitNotFound {
                file_name: self.file_name.clone(),
                commit_id: commit_id.to_string(),
            })
    }
}
