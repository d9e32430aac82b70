use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::git::GitRepo;
use crate::model::{Commit, DateRange};
use crate::report::LogSink;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

/// Commit records of one repository, oldest revision first.
pub struct MinedHistory {
    pub repository_path: String,
    pub commits: Vec<Commit>,
}

pub fn fetch_commits(
    common: &CommonArgs,
    show_progress: bool,
    log: &mut dyn LogSink,
) -> anyhow::Result<MinedHistory> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let mut cache = Cache::new(common.cache.as_deref(), repo.path()).context("Failed to initialize cache")?;

    let range = repo
        .resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;

    let commits = mine_commits(
        &repo,
        &mut cache,
        &range,
        common.include_merges,
        common.binary,
        show_progress,
        log,
    )?;

    Ok(MinedHistory {
        repository_path: repo.path().to_string_lossy().to_string(),
        commits,
    })
}

/// Loads cached revisions and diffs the missing ones. A revision that cannot
/// be diffed is reported on the error channel and skipped. The cache keeps
/// binary file changes, `binary` only decides whether they are returned.
pub fn mine_commits(
    repo: &GitRepo,
    cache: &mut Cache,
    range: &DateRange,
    include_merges: bool,
    binary: bool,
    show_progress: bool,
    log: &mut dyn LogSink,
) -> anyhow::Result<Vec<Commit>> {
    let revisions = repo
        .list_revisions(range, include_merges)
        .context("Failed to collect revisions from repository")?;

    let pb = if show_progress {
        let pb = ProgressBar::new(revisions.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Mining revisions...");
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut commits = Vec::new();
    let (mut loaded, mut mined) = (0usize, 0usize);
    for revision in &revisions {
        let cached = cache
            .get_commits(&revision.id, binary)
            .context("Failed to read cached commits")?;
        match cached {
            Some(records) => {
                loaded += 1;
                commits.extend(records);
            }
            None => match repo.mine_revision(revision) {
                Ok(changes) => {
                    cache
                        .store_commits(revision, &changes)
                        .context("Failed to store commits in cache")?;
                    mined += 1;
                    commits.extend(
                        changes
                            .into_iter()
                            .filter(|change| binary || !change.is_binary)
                            .map(|change| change.commit),
                    );
                }
                Err(e) => log.log_error(format!("Skipping revision {}: {e}", revision.id)),
            },
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    debug!("{loaded} revisions loaded from cache, {mined} newly mined");
    info!("Mined {} file changes from {} revisions", commits.len(), revisions.len());
    Ok(commits)
}
