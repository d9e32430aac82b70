use crate::cli::CommonArgs;
use crate::fetch::fetch_commits;
use crate::model::{SummaryOutput, SCHEMA_VERSION};
use crate::report::FilteredLog;
use crate::stats::{CommitStatistics, RepositoryStatistics};
use crate::util::print_errors;
use chrono::Utc;
use console::style;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let mut log = FilteredLog::new("Errors while mining the repository:");
    let history = fetch_commits(&common, !json, &mut log)?;
    print_errors(&mut log);

    let statistics = CommitStatistics::new(&history.commits);
    let mut report = FilteredLog::new("Errors while summarizing commits:");
    statistics.log_to(&mut report);
    let file_count = RepositoryStatistics::from_commits(&history.commits).len();

    if json {
        let output = SummaryOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository_path: history.repository_path,
            since: common.since.clone(),
            until: common.until.clone(),
            file_count,
            statistics,
            report: report.info_messages().to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output_summary(&statistics, file_count, &report);
    }

    Ok(())
}

fn output_summary(statistics: &CommitStatistics, file_count: usize, report: &FilteredLog) {
    println!("{}", style("Repository Summary").bold());
    println!("{}", "─".repeat(50));
    for line in report.info_messages() {
        println!("{line}");
    }
    println!();
    println!("Files tracked: {}", style(file_count).cyan());
    println!("Authors: {}", style(statistics.author_count()).yellow());
    println!("Lines deleted: {}", style(statistics.deleted_lines()).red());
    println!("Absolute churn: {}", style(statistics.absolute_churn()).cyan());
    if statistics.add_count() > 0 {
        println!("Files added: {}", style(statistics.add_count()).green());
    }
}
