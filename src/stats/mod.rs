pub mod commit;
pub mod file;
pub mod repository;

pub use commit::CommitStatistics;
pub use file::FileStatistics;
pub use repository::RepositoryStatistics;
