use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn init_git_repo(dir: &Path) {
    // init and basic identity
    assert!(Command::new("git")
        .args(["init"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "core.autocrlf", "false"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "core.safecrlf", "false"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.email", "you@example.com"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.name", "Your Name"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn ensure_clean(dir: &Path) {
    assert!(Command::new("git")
        .args(["reset", "--hard"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn git_at(dir: &Path, args: &[&str], date: Option<&str>) {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir);
    if let Some(date) = date {
        cmd.env("GIT_AUTHOR_DATE", date).env("GIT_COMMITTER_DATE", date);
    }
    assert!(cmd.status().unwrap().success());
}

fn commit_bytes_at(dir: &Path, name: &str, content: &[u8], date: Option<&str>) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content).unwrap();
    f.sync_all().unwrap();
    git_at(dir, &["add", "."], None);
    git_at(dir, &["commit", "-q", "-m", &format!("add {name}")], date);
    ensure_clean(dir);
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    commit_bytes_at(dir, name, content.as_bytes(), None);
}

fn commit_file_at(dir: &Path, name: &str, content: &str, date: &str) {
    commit_bytes_at(dir, name, content.as_bytes(), Some(date));
}

fn remove_file_at(dir: &Path, name: &str, date: Option<&str>) {
    git_at(dir, &["rm", "-q", name], None);
    git_at(dir, &["commit", "-q", "-m", &format!("remove {name}")], date);
}

fn remove_file(dir: &Path, name: &str) {
    remove_file_at(dir, name, None);
}

fn gforensics(repo: &Path, cache: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gforensics").unwrap();
    cmd.current_dir(repo).arg("--repo").arg(repo).arg("--cache").arg(cache);
    cmd
}

fn run_json(repo: &Path, cache: &Path, args: &[&str]) -> serde_json::Value {
    let mut cmd = gforensics(repo, cache);
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn summary_json_reports_totals() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "src/a.rs", "fn a(){}\n");
    commit_file(dir.path(), "src/b.rs", "fn b(){}\nfn c(){}\n");

    let v = run_json(dir.path(), cache.path(), &["summary", "--json"]);
    assert_eq!(v["commit_count"].as_u64(), Some(2));
    assert_eq!(v["added_lines"].as_u64(), Some(3));
    assert_eq!(v["author_count"].as_u64(), Some(1));
    assert_eq!(v["file_count"].as_u64(), Some(2));
    assert_eq!(v["report"][0].as_str(), Some("-> 2 commits analyzed"));
}

#[test]
fn files_json_outputs_entries_with_links() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "lib.rs", "pub fn hi(){}\n");
    commit_file(dir.path(), "lib.rs", "pub fn hi(){ println!(\"hi\"); }\n");

    let v = run_json(dir.path(), cache.path(), &["files", "--json"]);
    let entries = v["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["path"].as_str(), Some("lib.rs"));
    assert_eq!(entries[0]["commit_count"].as_u64(), Some(2));
    assert!(entries[0]["link"].as_str().unwrap().starts_with("fileName."));

    // second run is served from the cache
    let again = run_json(dir.path(), cache.path(), &["files", "--json"]);
    assert_eq!(again["entries"], v["entries"]);
}

#[test]
fn file_details_resolve_links() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "notes.txt", "a\n");
    commit_file(dir.path(), "notes.txt", "a\nb\nc\n");

    let files = run_json(dir.path(), cache.path(), &["files", "--json"]);
    let link = files["entries"][0]["link"].as_str().unwrap().to_string();

    let v = run_json(dir.path(), cache.path(), &["file", &link, "--json"]);
    assert_eq!(v["file_name"].as_str(), Some("notes.txt"));
    let rows = v["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["added_lines"].as_u64(), Some(1));
    assert_eq!(rows[1]["added_lines"].as_u64(), Some(2));
    assert_eq!(rows[1]["author"].as_str(), Some("Your Name"));
}

#[test]
fn unknown_file_link_fails() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "a\n");

    gforensics(dir.path(), cache.path())
        .args(["file", "fileName.12345"])
        .assert()
        .failure();
}

#[test]
fn deleted_files_remain_listed() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "keep.txt", "k\n");
    commit_file(dir.path(), "gone.txt", "g\ng\n");
    remove_file(dir.path(), "gone.txt");

    let v = run_json(dir.path(), cache.path(), &["files", "--json", "--sort", "name"]);
    let entries = v["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["path"].as_str(), Some("gone.txt"));
    assert_eq!(entries[0]["deleted"].as_bool(), Some(true));
    assert_eq!(entries[0]["lines_of_code"].as_i64(), Some(0));
    assert_eq!(entries[1]["deleted"].as_bool(), Some(false));

    let summary = run_json(dir.path(), cache.path(), &["summary", "--json"]);
    assert_eq!(summary["delete_count"].as_u64(), Some(1));
    assert_eq!(summary["commit_count"].as_u64(), Some(3));
}

#[test]
fn include_merges_flag_affects_counts() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());

    // create base
    commit_file(dir.path(), "file.txt", "a\n");

    // create feature branch and diverge on a different file
    assert!(Command::new("git")
        .args(["checkout", "-q", "-b", "feat"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());
    commit_file(dir.path(), "feat.txt", "f1\n");

    // return to the base branch and diverge on original file
    assert!(Command::new("git")
        .args(["checkout", "-q", "-"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());
    commit_file(dir.path(), "file.txt", "a\nc\n");

    assert!(Command::new("git")
        .args(["merge", "--no-ff", "feat", "-m", "merge feat"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());

    let without = run_json(dir.path(), cache.path(), &["summary", "--json"]);
    let with = run_json(dir.path(), cache.path(), &["--include-merges", "summary", "--json"]);

    assert_eq!(without["commit_count"].as_u64(), Some(3));
    assert!(with["commit_count"].as_u64().unwrap() >= 3);
}

#[test]
fn binary_flag_is_honoured_on_cached_revisions() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "a\n");
    commit_bytes_at(dir.path(), "img.bin", b"\x89PNG\x00\x00\x01\x02", None);

    let text_only = run_json(dir.path(), cache.path(), &["files", "--json"]);
    assert_eq!(text_only["entries"].as_array().unwrap().len(), 1);

    let with_binary = run_json(dir.path(), cache.path(), &["--binary", "files", "--json", "--sort", "name"]);
    let entries = with_binary["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["path"].as_str(), Some("img.bin"));
    assert_eq!(entries[1]["added_lines"].as_u64(), Some(0));

    let again = run_json(dir.path(), cache.path(), &["files", "--json"]);
    assert_eq!(again["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn deletion_on_merged_branch_with_equal_timestamps() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    let date = "2021-03-01T12:00:00+00:00";
    init_git_repo(dir.path());
    commit_file_at(dir.path(), "f.txt", "f\n", date);

    git_at(dir.path(), &["checkout", "-q", "-b", "feat"], None);
    commit_file_at(dir.path(), "g.txt", "g\n", date);

    git_at(dir.path(), &["checkout", "-q", "-"], None);
    remove_file_at(dir.path(), "f.txt", Some(date));
    git_at(dir.path(), &["merge", "-q", "--no-ff", "feat", "-m", "merge feat"], Some(date));

    let details = run_json(dir.path(), cache.path(), &["file", "f.txt", "--json"]);
    let rows = details["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["added_lines"].as_u64(), Some(1));
    assert_eq!(rows[1]["deleted_lines"].as_u64(), Some(1));

    let files = run_json(dir.path(), cache.path(), &["files", "--json", "--sort", "name"]);
    let entries = files["entries"].as_array().unwrap();
    assert_eq!(entries[0]["path"].as_str(), Some("f.txt"));
    assert_eq!(entries[0]["deleted"].as_bool(), Some(true));
    assert_eq!(entries[1]["deleted"].as_bool(), Some(false));
}

#[test]
fn latin1_text_files_count_lines() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_bytes_at(dir.path(), "l.txt", b"caf\xe9\n", None);
    commit_bytes_at(dir.path(), "l.txt", b"caf\xe9!\nna\xefve\n", None);

    let v = run_json(dir.path(), cache.path(), &["file", "l.txt", "--json"]);
    let rows = v["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["added_lines"].as_u64(), Some(1));
    assert_eq!(rows[1]["added_lines"].as_u64(), Some(2));
    assert_eq!(rows[1]["deleted_lines"].as_u64(), Some(1));
}

fn dated_history(dir: &Path) {
    init_git_repo(dir);
    commit_file_at(dir, "a.txt", "a\n", "2020-01-01T12:00:00+00:00");
    commit_file_at(dir, "b.txt", "b\n", "2021-01-01T12:00:00+00:00");
    commit_file(dir, "c.txt", "c\n");
}

fn commit_count(dir: &Path, cache: &Path, range: &[&str]) -> u64 {
    let mut args = range.to_vec();
    args.extend(["summary", "--json"]);
    run_json(dir, cache, &args)["commit_count"].as_u64().unwrap()
}

#[test]
fn since_and_until_accept_dates() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    dated_history(dir.path());

    assert_eq!(commit_count(dir.path(), cache.path(), &[]), 3);
    assert_eq!(commit_count(dir.path(), cache.path(), &["--since", "2020-06-01"]), 2);
    assert_eq!(commit_count(dir.path(), cache.path(), &["--until", "2020-06-01"]), 1);
    assert_eq!(
        commit_count(
            dir.path(),
            cache.path(),
            &["--since", "2020-06-01T00:00:00Z", "--until", "2021-06-01T00:00:00Z"]
        ),
        1
    );
}

#[test]
fn since_accepts_revisions() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    dated_history(dir.path());

    assert_eq!(commit_count(dir.path(), cache.path(), &["--since", "HEAD~1"]), 2);
    assert_eq!(commit_count(dir.path(), cache.path(), &["--until", "HEAD~2"]), 1);
}

#[test]
fn since_accepts_relative_durations() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    dated_history(dir.path());

    assert_eq!(commit_count(dir.path(), cache.path(), &["--since", "30days"]), 1);
    assert_eq!(commit_count(dir.path(), cache.path(), &["--since", "2 weeks ago"]), 1);
    assert_eq!(commit_count(dir.path(), cache.path(), &["--since", "3650d"]), 3);
}

#[test]
fn since_after_until_fails() {
    let dir = tempdir().unwrap();
    let cache = tempdir().unwrap();
    if !has_git() {
        return;
    }
    dated_history(dir.path());

    gforensics(dir.path(), cache.path())
        .args(["--since", "2021-06-01", "--until", "2020-06-01", "summary", "--json"])
        .assert()
        .failure();
}
