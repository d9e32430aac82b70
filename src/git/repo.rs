use crate::error::{ForensicsError, Result};
use crate::model::{Commit, DateRange, MinedChange, RevisionInfo};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use log::{debug, trace};
use similar::{DiffTag, TextDiff};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let mut range = DateRange::new();

        let since_dt = if let Some(s) = since {
            Some(self.parse_commit_or_date(s)?)
        } else {
            None
        };

        let until_dt = if let Some(u) = until {
            Some(self.parse_commit_or_date(u)?)
        } else {
            None
        };

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(ForensicsError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }

        Ok(range)
    }


    fn parse_commit_or_date(&self, input: &str) -> Result<DateTime<Utc>> {
        // RFC3339
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        // YYYY-MM-DD
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&datetime));
            }
        }

        // Relative duration (e.g., "-90d", "2 weeks ago")
        if let Some(duration) = parse_natural_duration(input) {
            let now = SystemTime::now();
            let target = now.checked_sub(duration)
                .ok_or_else(|| ForensicsError::InvalidDate(format!("Duration overflow for '{input}'")))?;
            let dt: DateTime<Utc> = DateTime::<Utc>::from(target);
            return Ok(dt);
        }


        // Fallback to Git ref
        let id = self.repo.rev_parse_single(input)
            .map_err(|e| ForensicsError::Parse(format!("Invalid commit or date '{input}': {e}")))?;

        let commit = id.object()?
            .try_into_commit()
            .map_err(|_| ForensicsError::Parse(format!("Not a commit: {input}")))?;

        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| ForensicsError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }


    /// Walks the history reachable from HEAD, oldest revision first. A
    /// revision never precedes one of its parents, whatever the timestamps.
    pub fn list_revisions(&self, range: &DateRange, include_merges: bool) -> Result<Vec<RevisionInfo>> {
        let mut head = self.repo.head()?;
        let head_commit = head.peel_to_commit_in_place()?;

        let mut walked = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: Vec<ObjectId> = vec![head_commit.id];

        while let Some(commit_id) = stack.pop() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let secs = commit.time()?.seconds;
            let timestamp = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| ForensicsError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();
            walked.push(RevisionInfo {
                id: commit_id.to_string(),
                author: commit.author()?.name.to_string(),
                timestamp,
                parent_ids: parents.iter().map(|id| id.to_string()).collect(),
            });
            stack.extend(parents);
        }

        let revisions: Vec<RevisionInfo> = sort_topologically(walked)
            .into_iter()
            .filter(|r| range.contains(&r.timestamp) && (include_merges || r.parent_ids.len() <= 1))
            .collect();
        debug!("Found {} revisions to analyze", revisions.len());
        Ok(revisions)
    }

    /// Diffs `revision` against its first parent and returns one record per
    /// touched file. Binary files are included and flagged.
    pub fn mine_revision(&self, revision: &RevisionInfo) -> Result<Vec<MinedChange>> {
        let commit_id = parse_object_id(&revision.id)?;
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;

        let changes: Vec<ChangeDetached> = match revision.parent_ids.first() {
            Some(parent) => {
                let parent_tree = self.repo.find_commit(parse_object_id(parent)?)?.tree()?;
                self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?,
        };

        let mut mined = Vec::new();
        for change in changes {
            if let Some(record) = self.handle_change(revision, change)? {
                mined.push(record);
            }
        }
        trace!("Revision {} touched {} files", revision.id, mined.len());
        Ok(mined)
    }

    fn handle_change(&self, revision: &RevisionInfo, change: ChangeDetached) -> Result<Option<MinedChange>> {
        let mut commit = Commit::new(&revision.id, &revision.author, revision.timestamp.timestamp());
        let is_binary = match change {
            ChangeDetached::Addition { id, location, entry_mode, .. } => {
                if entry_mode.is_tree() {
                    return Ok(None);
                }
                let Ok(obj) = self.repo.find_object(id) else {
                    return Ok(None);
                };
                commit.set_new_path(location.to_string());
                commit.add_lines(count_lines(&obj));
                is_binary_object(&obj)
            }
            ChangeDetached::Deletion { id, location, entry_mode, .. } => {
                if entry_mode.is_tree() {
                    return Ok(None);
                }
                let Ok(obj) = self.repo.find_object(id) else {
                    return Ok(None);
                };
                commit.set_old_path(location.to_string());
                commit.delete_lines(count_lines(&obj));
                is_binary_object(&obj)
            }
            ChangeDetached::Modification {
                previous_id,
                id,
                location,
                entry_mode,
                ..
            } => {
                if entry_mode.is_tree() {
                    return Ok(None);
                }
                let (Ok(old_obj), Ok(new_obj)) =
                    (self.repo.find_object(previous_id), self.repo.find_object(id))
                else {
                    return Ok(None);
                };
                commit.set_old_path(location.to_string());
                commit.set_new_path(location.to_string());
                accumulate_hunks(&mut commit, &old_obj, &new_obj)
            }
            ChangeDetached::Rewrite {
                source_id,
                id,
                source_location,
                location,
                copy,
                ..
            } => {
                let (Ok(old_obj), Ok(new_obj)) =
                    (self.repo.find_object(source_id), self.repo.find_object(id))
                else {
                    return Ok(None);
                };
                if copy {
                    // the source stays untouched, the copy is a new file
                    commit.set_new_path(location.to_string());
                    commit.add_lines(count_lines(&new_obj));
                    is_binary_object(&new_obj)
                } else {
                    commit.set_old_path(source_location.to_string());
                    commit.set_new_path(location.to_string());
                    accumulate_hunks(&mut commit, &old_obj, &new_obj)
                }
            }
        };
        Ok(Some(MinedChange { commit, is_binary }))
    }
}

/// Adds one line count pair per hunk. Returns true, without counting, if
/// either side is binary.
fn accumulate_hunks(commit: &mut Commit, old_object: &gix::Object, new_object: &gix::Object) -> bool {
    if is_binary_object(old_object) || is_binary_object(new_object) {
        return true;
    }
    for (added, deleted) in diff_hunks(&old_object.data, &new_object.data) {
        commit.add_lines(added).delete_lines(deleted);
    }
    false
}

/// Orders revisions so every parent comes before its children. Among
/// revisions whose parents are all placed, the oldest goes first. Parents
/// outside the given set are ignored.
pub fn sort_topologically(revisions: Vec<RevisionInfo>) -> Vec<RevisionInfo> {
    let index: HashMap<&str, usize> = revisions
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); revisions.len()];
    let mut pending = vec![0usize; revisions.len()];
    for (i, revision) in revisions.iter().enumerate() {
        for parent in &revision.parent_ids {
            if let Some(&p) = index.get(parent.as_str()) {
                children[p].push(i);
                pending[i] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(DateTime<Utc>, usize)>> = pending
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n == 0)
        .map(|(i, _)| Reverse((revisions[i].timestamp, i)))
        .collect();

    let mut order = Vec::with_capacity(revisions.len());
    while let Some(Reverse((_, i))) = ready.pop() {
        order.push(i);
        for &child in &children[i] {
            pending[child] -= 1;
            if pending[child] == 0 {
                ready.push(Reverse((revisions[child].timestamp, child)));
            }
        }
    }

    let mut slots: Vec<Option<RevisionInfo>> = revisions.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::from_hex(id.as_bytes())
        .map_err(|e| ForensicsError::Parse(format!("Invalid commit ID: {e}")))
}

fn is_binary_object(object: &gix::Object) -> bool {
    object.data.as_slice().iter().take(8192).any(|&b| b == 0)
}

fn count_lines(object: &gix::Object) -> u32 {
    if is_binary_object(object) {
        return 0;
    }
    count_text_lines(&object.data)
}

/// Number of lines in `data`, counting a trailing line without a newline.
/// Works on raw bytes, so text in any ASCII compatible encoding is counted.
pub fn count_text_lines(data: &[u8]) -> u32 {
    let newlines = data.iter().filter(|&&b| b == b'\n').count();
    let unterminated = !data.is_empty() && !data.ends_with(b"\n");
    (newlines + usize::from(unterminated)) as u32
}

/// Added and deleted line counts of every hunk between two texts, in file order.
pub fn diff_hunks(old_text: &[u8], new_text: &[u8]) -> Vec<(u32, u32)> {
    let diff = TextDiff::from_lines(old_text, new_text);
    diff.grouped_ops(0)
        .iter()
        .map(|group| {
            group.iter().fold((0u32, 0u32), |(added, deleted), op| {
                let (tag, old_range, new_range) = op.as_tag_tuple();
                match tag {
                    DiffTag::Equal => (added, deleted),
                    _ => (added + new_range.len() as u32, deleted + old_range.len() as u32),
                }
            })
        })
        .filter(|&(added, deleted)| added > 0 || deleted > 0)
        .collect()
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    if let Some(days) = input.strip_suffix(" days ago") {
        if let Ok(n) = days.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 86400));
        }
    }

    if let Some(weeks) = input.strip_suffix(" weeks ago") {
        if let Ok(n) = weeks.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 7 * 86400));
        }
    }

    if let Some(months) = input.strip_suffix(" months ago") {
        if let Ok(n) = months.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 30 * 86400));
        }
    }

    // compact forms such as "90d" or "2weeks"
    let compact = input.strip_suffix(" ago").unwrap_or(&input).trim();
    humantime::parse_duration(compact).ok()
}