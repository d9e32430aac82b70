//! Churn and change-risk statistics over a repository's commit history.
//!
//! The [`stats`] module folds [`model::Commit`] records into repository totals
//! and per-file histories without any I/O. Mining those records from git,
//! caching them and presenting them live in the remaining modules.

pub mod cache;
pub mod churn;
pub mod cli;
pub mod details;
pub mod error;
pub mod export;
pub mod fetch;
pub mod git;
pub mod link;
pub mod model;
pub mod report;
pub mod stats;
pub mod summary;
pub mod util;

pub use error::{ForensicsError, Result};
pub use model::{Commit, PathChange, NO_FILE_NAME};
pub use report::{FilteredLog, LogSink};
pub use stats::{CommitStatistics, FileStatistics, RepositoryStatistics};
