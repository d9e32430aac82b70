use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gforensics")]
#[command(about = "Git forensics: file churn history, author attribution and repository totals")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Path to cache directory")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Include merge commits", default_value_t = false)]
    pub include_merges: bool,

    #[arg(long, help = "Include binary files (counted with zero lines)", default_value_t = false)]
    pub binary: bool,

    #[arg(long, help = "Start from this commit or date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub since: Option<String>,

    #[arg(long, help = "End at this commit or date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub until: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Churn,
    Commits,
    Authors,
    Name,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Repository wide totals and the commit report
    Summary {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Churn statistics for every file ever seen
    Files {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, value_enum, default_value_t = SortKey::Churn, help = "Sort order of the table")]
        sort: SortKey,

        #[arg(long, help = "Maximum number of rows in the table")]
        limit: Option<usize>,

        #[arg(help = "Path prefix to analyze")]
        path: Option<String>,
    },
    /// Per-commit history of one file
    File {
        #[arg(help = "File link (fileName.<hash>) or file name")]
        target: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Raw mined commit records
    Export {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Summary { json } => crate::summary::exec(self.common, json),
            Commands::Files { json, ndjson, sort, limit, path } => {
                crate::churn::exec(self.common, json, ndjson, sort, limit, path)
            }
            Commands::File { target, json } => crate::details::exec(self.common, target, json),
            Commands::Export { json, ndjson } => crate::export::exec(self.common, json, ndjson),
        }
    }
}
