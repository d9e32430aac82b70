use crate::error::{ForensicsError, Result};
use crate::model::{Commit, MinedChange, RevisionInfo, SCHEMA_VERSION};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Mined commit records keyed by revision, so only new revisions get diffed.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new<CP: AsRef<Path>, RP: AsRef<Path>>(cache_path: Option<CP>, repo_path: RP) -> Result<Self> {
        let cache_dir = match cache_path {
            Some(path) => path.as_ref().to_path_buf(),
            None => repo_path.as_ref().join(".gforensics"),
        };
        std::fs::create_dir_all(&cache_dir)?;
        let db_path = cache_dir.join("cache.db");
        let conn = Connection::open(&db_path)?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let mut cache = Self { conn: Connection::open_in_memory()? };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS revisions (
                id TEXT PRIMARY KEY,
                author TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS changes (
                revision_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                old_path TEXT,
                new_path TEXT,
                added_lines INTEGER NOT NULL,
                deleted_lines INTEGER NOT NULL,
                is_binary INTEGER NOT NULL,
                PRIMARY KEY (revision_id, seq),
                FOREIGN KEY (revision_id) REFERENCES revisions(id)
            );
            CREATE INDEX IF NOT EXISTS idx_revisions_timestamp ON revisions(timestamp);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(ForensicsError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    /// The records stored for `revision_id`, or `None` if it was never mined.
    /// Binary file changes are left out unless `include_binary` is set.
    pub fn get_commits(&self, revision_id: &str, include_binary: bool) -> Result<Option<Vec<Commit>>> {
        let revision: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT author, timestamp FROM revisions WHERE id = ?",
                params![revision_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((author, timestamp)) = revision else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT old_path, new_path, added_lines, deleted_lines
             FROM changes WHERE revision_id = ? AND (is_binary = 0 OR ?) ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![revision_id, include_binary], |row| {
            let old_path: Option<String> = row.get(0)?;
            let new_path: Option<String> = row.get(1)?;
            let added: u32 = row.get(2)?;
            let deleted: u32 = row.get(3)?;

            let mut commit = Commit::new(revision_id, author.as_str(), timestamp);
            commit.add_lines(added).delete_lines(deleted);
            if let Some(old) = old_path {
                commit.set_old_path(old);
            }
            if let Some(new) = new_path {
                commit.set_new_path(new);
            }
            Ok(commit)
        })?;

        let commits = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(commits))
    }

    pub fn store_commits(&mut self, revision: &RevisionInfo, changes: &[MinedChange]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            tx.execute(
                "INSERT OR REPLACE INTO revisions (id, author, timestamp) VALUES (?, ?, ?)",
                params![revision.id, revision.author, revision.timestamp.timestamp()],
            )?;
            tx.execute("DELETE FROM changes WHERE revision_id = ?", params![revision.id])?;

            let mut insert_change_stmt = tx.prepare(
                "INSERT INTO changes (revision_id, seq, old_path, new_path, added_lines, deleted_lines, is_binary)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for (seq, change) in changes.iter().enumerate() {
                let commit = &change.commit;
                insert_change_stmt.execute(params![
                    revision.id,
                    seq as i64,
                    commit.old_path(),
                    commit.new_path(),
                    commit.added_lines(),
                    commit.deleted_lines(),
                    change.is_binary
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn revision_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM revisions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
