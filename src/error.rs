use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForensicsError>;

#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("No file found with name {0}")]
    FileNotFound(String),
    #[error("No file found with hash code {0}")]
    HashNotFound(i32),
    #[error("No commit {commit_id} recorded for file {file_name}")]
    CommitNotFound { file_name: String, commit_id: String },
    #[error("Invalid file link: {0}")]
    InvalidLink(String),
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::open::Error> for ForensicsError {
    fn from(err: gix::open::Error) -> Self {
        ForensicsError::Git(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for ForensicsError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        ForensicsError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for ForensicsError {
    fn from(err: gix::object::commit::Error) -> Self {
        ForensicsError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for ForensicsError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        ForensicsError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for ForensicsError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        ForensicsError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for ForensicsError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        ForensicsError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for ForensicsError {
    fn from(err: gix::objs::decode::Error) -> Self {
        ForensicsError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for ForensicsError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        ForensicsError::DiffTreeToTree(Box::new(err))
    }
}

impl From<gix::discover::Error> for ForensicsError {
    fn from(err: gix::discover::Error) -> Self {
        ForensicsError::GitDiscover(Box::new(err))
    }
}
