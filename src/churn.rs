use crate::cli::{CommonArgs, SortKey};
use crate::fetch::fetch_commits;
use crate::model::{FileEntry, FilesOutput, SCHEMA_VERSION};
use crate::report::FilteredLog;
use crate::stats::{FileStatistics, RepositoryStatistics};
use crate::util::{commits_matching, print_errors};
use chrono::Utc;
use console::style;

const DEFAULT_LIMIT: usize = 50;

pub fn exec(
    common: CommonArgs,
    json: bool,
    ndjson: bool,
    sort: SortKey,
    limit: Option<usize>,
    path: Option<String>,
) -> anyhow::Result<()> {
    let mut log = FilteredLog::new("Errors while mining the repository:");
    let history = fetch_commits(&common, !(json || ndjson), &mut log)?;
    print_errors(&mut log);

    let repository =
        RepositoryStatistics::from_commits(commits_matching(&history.commits, path.as_deref()));
    let entries = file_entries(&repository, sort);

    if json {
        let output = FilesOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository_path: history.repository_path,
            since: common.since.clone(),
            until: common.until.clone(),
            entries,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if ndjson {
        for e in &entries {
            println!("{}", serde_json::to_string(e)?);
        }
    } else {
        output_table(&entries, limit.unwrap_or(DEFAULT_LIMIT));
    }

    Ok(())
}

pub fn file_entries(repository: &RepositoryStatistics, sort: SortKey) -> Vec<FileEntry> {
    let mut entries: Vec<FileEntry> = repository.all().map(file_entry).collect();
    match sort {
        SortKey::Churn => entries.sort_by(|a, b| b.absolute_churn.cmp(&a.absolute_churn)),
        SortKey::Commits => entries.sort_by(|a, b| b.commit_count.cmp(&a.commit_count)),
        SortKey::Authors => entries.sort_by(|a, b| b.author_count.cmp(&a.author_count)),
        SortKey::Name => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}

fn file_entry(file: &FileStatistics) -> FileEntry {
    FileEntry {
        path: file.file_name().to_string(),
        link: file.link(),
        commit_count: file.commit_count(),
        author_count: file.author_count(),
        added_lines: file.total_added_lines(),
        deleted_lines: file.total_deleted_lines(),
        lines_of_code: file.lines_of_code(),
        absolute_churn: file.absolute_churn(),
        created: file.creation_time(),
        last_modified: file.last_modification_time(),
        deleted: file.is_deleted(),
        old_names: file.old_names().to_vec(),
    }
}

fn output_table(entries: &[FileEntry], limit: usize) {
    println!(
        "{:<50} {:>8} {:>8} {:>8} {:>7} {:>7} {:>16}",
        style("Path").bold(),
        style("Added").bold(),
        style("Deleted").bold(),
        style("Churn").bold(),
        style("Commits").bold(),
        style("Authors").bold(),
        style("Link").bold()
    );
    println!("{}", "─".repeat(110));
    for e in entries.iter().take(limit) {
        let path = format!("{:<50}", e.path);
        let path = if e.deleted { style(path).dim() } else { style(path) };
        println!(
            "{} {:>8} {:>8} {:>8} {:>7} {:>7} {:>16}",
            path,
            e.added_lines,
            e.deleted_lines,
            e.absolute_churn,
            e.commit_count,
            e.author_count,
            e.link
        );
    }
    if entries.len() > limit {
        println!("\n... and {} more entries", entries.len() - limit);
    }
}
