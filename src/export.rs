use crate::cli::CommonArgs;
use crate::fetch::fetch_commits;
use crate::model::{Commit, ExportOutput, PathChange};
use crate::report::FilteredLog;
use crate::util::print_errors;
use chrono::Utc;
use console::style;
use std::collections::HashSet;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let mut log = FilteredLog::new("Errors while mining the repository:");
    let history = fetch_commits(&common, !(json || ndjson), &mut log)?;
    print_errors(&mut log);

    if json {
        let output = ExportOutput {
            version: crate::model::SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository_path: history.repository_path,
            since: common.since.clone(),
            until: common.until.clone(),
            entries: history.commits,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if ndjson {
        for commit in &history.commits {
            println!("{}", serde_json::to_string(commit)?);
        }
    } else {
        output_summary(&history.commits);
    }

    Ok(())
}

fn output_summary(commits: &[Commit]) {
    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));

    let revisions: HashSet<_> = commits.iter().map(Commit::revision_id).collect();
    let files: HashSet<_> = commits.iter().map(Commit::file_name).collect();
    println!("Revisions: {}", style(revisions.len()).cyan());
    println!("File changes: {}", style(commits.len()).cyan());
    println!("Distinct files: {}", style(files.len()).cyan());

    for change in [PathChange::Add, PathChange::Modify, PathChange::Rename, PathChange::Delete] {
        let n = commits.iter().filter(|c| c.change() == change).count();
        println!("{:<8} {}", change.label(), n);
    }

    println!("\nUse --json or --ndjson flags to export the raw data.");
}
