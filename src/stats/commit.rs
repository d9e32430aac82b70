use crate::model::{Commit, PathChange};
use crate::report::LogSink;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Repository wide totals over a sequence of mined commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatistics {
    added_lines: u64,
    deleted_lines: u64,
    lines_of_code: i64,
    absolute_churn: u64,
    author_count: usize,
    commit_count: usize,
    modify_count: usize,
    rename_count: usize,
    delete_count: usize,
    add_count: usize,
}

impl CommitStatistics {
    pub fn new(commits: &[Commit]) -> Self {
        let added_lines: u64 = commits.iter().map(|c| u64::from(c.added_lines())).sum();
        let deleted_lines: u64 = commits.iter().map(|c| u64::from(c.deleted_lines())).sum();
        let authors: HashSet<&str> = commits.iter().map(Commit::author).collect();
        let revisions: HashSet<&str> = commits.iter().map(Commit::revision_id).collect();

        Self {
            added_lines,
            deleted_lines,
            lines_of_code: added_lines as i64 - deleted_lines as i64,
            absolute_churn: added_lines + deleted_lines,
            author_count: authors.len(),
            commit_count: revisions.len(),
            modify_count: Self::count_changes(commits),
            rename_count: Self::count_moves(commits),
            delete_count: Self::count_deletes(commits),
            add_count: Self::count_adds(commits),
        }
    }

    pub fn count_changes(commits: &[Commit]) -> usize {
        count(commits, PathChange::Modify)
    }

    pub fn count_moves(commits: &[Commit]) -> usize {
        count(commits, PathChange::Rename)
    }

    pub fn count_deletes(commits: &[Commit]) -> usize {
        count(commits, PathChange::Delete)
    }

    pub fn count_adds(commits: &[Commit]) -> usize {
        count(commits, PathChange::Add)
    }

    /// Writes the summary of `commits` to `log`. Classification lines are
    /// only written for non-zero counts.
    pub fn log_commits(commits: &[Commit], log: &mut dyn LogSink) {
        Self::new(commits).log_to(log);
    }

    pub fn log_to(&self, log: &mut dyn LogSink) {
        log.log_info(format!("-> {} commits analyzed", self.commit_count));
        for (change, n) in [
            (PathChange::Modify, self.modify_count),
            (PathChange::Rename, self.rename_count),
            (PathChange::Delete, self.delete_count),
        ] {
            if n > 0 {
                log.log_info(format!("-> {n} {change} commits"));
            }
        }
        log.log_info(format!("-> {} lines added", self.added_lines));
        log.log_info(format!("-> {} net lines of code", self.lines_of_code));
    }

    pub fn added_lines(&self) -> u64 {
        self.added_lines
    }

    pub fn deleted_lines(&self) -> u64 {
        self.deleted_lines
    }

    /// Added minus deleted lines; negative when more lines were removed.
    pub fn lines_of_code(&self) -> i64 {
        self.lines_of_code
    }

    pub fn absolute_churn(&self) -> u64 {
        self.absolute_churn
    }

    pub fn author_count(&self) -> usize {
        self.author_count
    }

    /// Number of distinct revisions; a revision touching several files counts once.
    pub fn commit_count(&self) -> usize {
        self.commit_count
    }

    pub fn modify_count(&self) -> usize {
        self.modify_count
    }

    pub fn rename_count(&self) -> usize {
        self.rename_count
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count
    }

    pub fn add_count(&self) -> usize {
        self.add_count
    }
}

fn count(commits: &[Commit], change: PathChange) -> usize {
    commits.iter().filter(|c| c.change() == change).count()
}
