use super::FileStatistics;
use crate::error::{ForensicsError, Result};
use crate::link::{file_hash, parse_link};
use crate::model::Commit;
use log::trace;
use std::collections::HashMap;

/// Index of every file ever seen in the mined history, deleted files included.
#[derive(Debug, Clone, Default)]
pub struct RepositoryStatistics {
    files: HashMap<String, FileStatistics>,
    order: Vec<String>,
    hashes: HashMap<i32, String>,
}

impl RepositoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commits<'a>(commits: impl IntoIterator<Item = &'a Commit>) -> Self {
        let mut statistics = Self::new();
        statistics.add_all(commits);
        statistics
    }

    /// Routes every commit, in order, to the statistics of its current file name.
    pub fn add_all<'a>(&mut self, commits: impl IntoIterator<Item = &'a Commit>) {
        for commit in commits {
            self.add(commit);
        }
    }

    pub fn add(&mut self, commit: &Commit) {
        let file_name = commit.file_name();
        if !self.files.contains_key(file_name) {
            trace!("Tracking new file {file_name}");
            self.order.push(file_name.to_string());
            self.hashes
                .entry(file_hash(file_name))
                .or_insert_with(|| file_name.to_string());
        }
        self.files
            .entry(file_name.to_string())
            .or_insert_with(|| FileStatistics::new(file_name))
            .accept(commit);
    }

    pub fn get(&self, file_name: &str) -> Result<&FileStatistics> {
        self.files
            .get(file_name)
            .ok_or_else(|| ForensicsError::FileNotFound(file_name.to_string()))
    }

    /// Resolves a [`file_hash`] back to its file. On a collision the file
    /// seen first wins.
    pub fn get_by_hash(&self, hash: i32) -> Result<&FileStatistics> {
        self.hashes
            .get(&hash)
            .and_then(|name| self.files.get(name))
            .ok_or(ForensicsError::HashNotFound(hash))
    }

    pub fn get_by_link(&self, link: &str) -> Result<&FileStatistics> {
        self.get_by_hash(parse_link(link)?)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains_key(file_name)
    }

    /// All tracked files in first-seen order.
    pub fn all(&self) -> impl Iterator<Item = &FileStatistics> + '_ {
        self.order.iter().filter_map(|name| self.files.get(name))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
