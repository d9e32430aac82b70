pub mod repo;

pub use repo::{count_text_lines, diff_hunks, sort_topologically, GitRepo};
