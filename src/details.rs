use crate::cli::CommonArgs;
use crate::error::Result;
use crate::fetch::fetch_commits;
use crate::link::LINK_PREFIX;
use crate::report::FilteredLog;
use crate::stats::{FileStatistics, RepositoryStatistics};
use anyhow::Context;
use console::style;
use serde::{Deserialize, Serialize};

const ADDED_KEY: &str = "added";
const DELETED_KEY: &str = "deleted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsRow {
    pub commit_id: String,
    pub author: String,
    pub added_lines: u64,
    pub deleted_lines: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub name: String,
    pub data: Vec<u64>,
}

/// Added and deleted lines per commit, one label per commit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnTrend {
    pub labels: Vec<String>,
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    pub file_name: String,
    pub link: String,
    pub rows: Vec<DetailsRow>,
    pub trend: ChurnTrend,
}

impl FileDetails {
    pub fn new(file: &FileStatistics) -> Result<Self> {
        let rows = file
            .commits()
            .iter()
            .map(|commit_id| {
                Ok(DetailsRow {
                    commit_id: commit_id.clone(),
                    author: file.author(commit_id)?.to_string(),
                    added_lines: file.added_lines(commit_id)?,
                    deleted_lines: file.deleted_lines(commit_id)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            file_name: file.file_name().to_string(),
            link: file.link(),
            trend: churn_trend(&rows),
            rows,
        })
    }

    /// Accepts either an outbound link (`fileName.<hash>`) or a plain file name.
    pub fn resolve(repository: &RepositoryStatistics, target: &str) -> Result<Self> {
        let file = if target.starts_with(LINK_PREFIX) && !repository.contains(target) {
            repository.get_by_link(target)?
        } else {
            repository.get(target)?
        };
        Self::new(file)
    }
}

fn churn_trend(rows: &[DetailsRow]) -> ChurnTrend {
    ChurnTrend {
        labels: rows.iter().map(|r| r.commit_id.clone()).collect(),
        series: vec![
            TrendSeries {
                name: ADDED_KEY.to_string(),
                data: rows.iter().map(|r| r.added_lines).collect(),
            },
            TrendSeries {
                name: DELETED_KEY.to_string(),
                data: rows.iter().map(|r| r.deleted_lines).collect(),
            },
        ],
    }
}

pub fn exec(common: CommonArgs, target: String, json: bool) -> anyhow::Result<()> {
    let mut log = FilteredLog::new("Errors while mining the repository:");
    let history = fetch_commits(&common, !json, &mut log)?;
    crate::util::print_errors(&mut log);

    let repository = RepositoryStatistics::from_commits(&history.commits);
    let details = FileDetails::resolve(&repository, &target)
        .with_context(|| format!("Failed to resolve file '{target}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        output_table(&details);
    }
    Ok(())
}

fn output_table(details: &FileDetails) {
    println!("{} ({})", style(&details.file_name).bold(), style(&details.link).dim());
    println!(
        "{:<42} {:<24} {:>8} {:>8}",
        style("Commit").bold(),
        style("Author").bold(),
        style("Added").bold(),
        style("Deleted").bold()
    );
    println!("{}", "─".repeat(85));
    for row in &details.rows {
        println!(
            "{:<42} {:<24} {:>8} {:>8}",
            row.commit_id,
            row.author,
            style(row.added_lines).green(),
            style(row.deleted_lines).red()
        );
    }
}
