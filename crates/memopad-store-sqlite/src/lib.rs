use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use memopad_core::{
    format_date, format_timestamp, parse_timestamp, Memo, MemoDraft, MemoError, MemoField, MemoId,
    TextQuery,
};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, Params};
use time::{Date, PrimitiveDateTime};

mod paths;

pub use paths::{backup_path_for, StorePaths, BACKUP_SUFFIX, DEFAULT_STORE_NAME};

// Rollback journal (the SQLite default) keeps every committed row inside the main file,
// so a plain file copy is a complete backup.
const CREATE_SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS memos (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  timestamp TEXT NOT NULL CHECK (length(timestamp) > 0),
  title TEXT NOT NULL CHECK (length(title) > 0),
  body TEXT NOT NULL CHECK (length(body) > 0),
  tags TEXT NOT NULL CHECK (length(tags) > 0)
);
";

const SELECT_MEMO_COLUMNS: &str = "SELECT id, timestamp, title, body, tags FROM memos";

/// Result of an identifier-addressed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    /// The identifier fell outside `1..=count()` when the call was made.
    OutOfRange,
    /// The identifier was in range but no row carries it (a gap left by a delete).
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub ok: bool,
    pub message: String,
}

/// Memo table in one SQLite file. Holds only the path; every operation opens its own
/// connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct SqliteMemoStore {
    path: PathBuf,
}

impl SqliteMemoStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Open or initialize the store file and apply the schema (create-if-absent).
    ///
    /// # Errors
    /// Returns an error when the file cannot be opened or cannot hold the memo schema.
    pub fn create(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create parent directory for store {}", self.path.display())
                })?;
            }
        }

        let created = !self.exists();
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open sqlite database at {}", self.path.display()))?;
        configure(&conn)?;
        conn.execute_batch(CREATE_SCHEMA_SQL)
            .with_context(|| format!("failed to apply memo schema to {}", self.path.display()))?;

        if created {
            tracing::info!(store = %self.path.display(), "created new memo store");
        }
        Ok(())
    }

    /// Append a memo and return its store-assigned identifier. Creates the store first
    /// when the file does not exist yet.
    ///
    /// # Errors
    /// Returns an error when the store cannot be created or the insert fails.
    pub fn insert(&self, draft: &MemoDraft, timestamp: PrimitiveDateTime) -> Result<MemoId> {
        if !self.exists() {
            self.create()?;
        }

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO memos(timestamp, title, body, tags) VALUES (?1, ?2, ?3, ?4)",
            params![format_timestamp(timestamp)?, draft.title(), draft.body(), draft.tags()],
        )
        .context("failed to insert memo")?;

        let id = MemoId(conn.last_insert_rowid());
        tracing::debug!(%id, "memo inserted");
        Ok(id)
    }

    /// # Errors
    /// Returns an error when the store is missing or the row cannot be decoded.
    pub fn get(&self, id: MemoId) -> Result<Option<Memo>> {
        let conn = self.connect()?;
        let row = conn
            .query_row(&format!("{SELECT_MEMO_COLUMNS} WHERE id = ?1"), params![id.get()], raw_row)
            .optional()
            .with_context(|| format!("failed to load memo {id}"))?;
        row.map(RawMemo::into_memo).transpose()
    }

    /// Newest memos first, at most `limit` of them.
    ///
    /// # Errors
    /// Returns an error when the store is missing or rows cannot be read.
    pub fn recent(&self, limit: usize) -> Result<Vec<Memo>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.connect()?;
        query_memos(
            &conn,
            &format!("{SELECT_MEMO_COLUMNS} ORDER BY id DESC LIMIT ?1"),
            params![limit],
        )
    }

    /// Every memo in creation order.
    ///
    /// # Errors
    /// Returns an error when the store is missing or rows cannot be read.
    pub fn list_all(&self) -> Result<Vec<Memo>> {
        let conn = self.connect()?;
        query_memos(&conn, &format!("{SELECT_MEMO_COLUMNS} ORDER BY id ASC"), [])
    }

    /// # Errors
    /// Returns an error when the store is missing or the count query fails.
    pub fn count(&self) -> Result<i64> {
        let conn = self.connect()?;
        count_rows(&conn)
    }

    /// Replace one field and re-stamp the memo in a single statement.
    ///
    /// # Errors
    /// Returns an error when the store is missing or the write fails.
    pub fn update_field(
        &self,
        id: MemoId,
        field: MemoField,
        value: &str,
        timestamp: PrimitiveDateTime,
    ) -> Result<Mutation> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().context("failed to start update transaction")?;

        if !in_range(&tx, id)? {
            return Ok(Mutation::OutOfRange);
        }

        let changed = tx
            .execute(
                &format!("UPDATE memos SET timestamp = ?1, {} = ?2 WHERE id = ?3", field.column()),
                params![format_timestamp(timestamp)?, value, id.get()],
            )
            .with_context(|| format!("failed to update {} of memo {id}", field.column()))?;

        tx.commit().context("failed to commit update transaction")?;
        if changed == 0 {
            return Ok(Mutation::Missing);
        }
        tracing::debug!(%id, field = field.column(), "memo updated");
        Ok(Mutation::Applied)
    }

    /// # Errors
    /// Returns an error when the store is missing or the delete fails.
    pub fn delete(&self, id: MemoId) -> Result<Mutation> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().context("failed to start delete transaction")?;

        if !in_range(&tx, id)? {
            return Ok(Mutation::OutOfRange);
        }

        let removed = tx
            .execute("DELETE FROM memos WHERE id = ?1", params![id.get()])
            .with_context(|| format!("failed to delete memo {id}"))?;

        tx.commit().context("failed to commit delete transaction")?;
        if removed == 0 {
            return Ok(Mutation::Missing);
        }
        tracing::debug!(%id, "memo deleted");
        Ok(Mutation::Applied)
    }

    /// Remove every memo and return how many were removed.
    ///
    /// # Errors
    /// Returns an error when the store is missing or the delete fails.
    pub fn delete_all(&self) -> Result<usize> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM memos", []).context("failed to delete all memos")?;
        tracing::debug!(removed, "all memos deleted");
        Ok(removed)
    }

    /// Memos whose timestamp falls on `date`, in identifier order.
    ///
    /// # Errors
    /// Returns an error when the store is missing or rows cannot be read.
    pub fn search_date(&self, date: Date) -> Result<Vec<Memo>> {
        let conn = self.connect()?;
        query_memos(
            &conn,
            &format!("{SELECT_MEMO_COLUMNS} WHERE date(timestamp) = ?1 ORDER BY id ASC"),
            params![format_date(date)?],
        )
    }

    /// Memos whose `field` contains `query`, ignoring case, in identifier order.
    ///
    /// SQLite `LIKE` only folds ASCII, so the predicate runs here instead.
    ///
    /// # Errors
    /// Returns an error when the store is missing or rows cannot be read.
    pub fn search_text(&self, field: MemoField, query: &TextQuery) -> Result<Vec<Memo>> {
        let memos = self.list_all()?;
        Ok(memos.into_iter().filter(|memo| query.matches(memo.field(field))).collect())
    }

    /// Run `PRAGMA integrity_check`. A file the engine refuses to read as a database is
    /// reported as corrupt rather than as an error.
    ///
    /// # Errors
    /// Returns an error when the store is missing or the probe fails for another reason.
    pub fn integrity_check(&self) -> Result<IntegrityReport> {
        let conn = self.connect()?;
        match conn.query_row("PRAGMA integrity_check", [], |row| row.get::<_, String>(0)) {
            Ok(message) => Ok(IntegrityReport { ok: message == "ok", message }),
            Err(rusqlite::Error::SqliteFailure(err, detail))
                if matches!(err.code, ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) =>
            {
                Ok(IntegrityReport {
                    ok: false,
                    message: detail.unwrap_or_else(|| err.to_string()),
                })
            }
            Err(err) => Err(err).context("failed to run PRAGMA integrity_check"),
        }
    }

    fn connect(&self) -> Result<Connection> {
        if !self.exists() {
            return Err(MemoError::StoreMissing(self.path.clone()).into());
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open sqlite database at {}", self.path.display()))?;
        configure(&conn)?;
        Ok(conn)
    }
}

fn configure(conn: &Connection) -> Result<()> {
    conn.busy_timeout(Duration::from_millis(5000)).context("failed to configure sqlite busy timeout")
}

fn count_rows(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM memos", [], |row| row.get::<_, i64>(0))
        .context("failed to count memos")
}

fn in_range(conn: &Connection, id: MemoId) -> Result<bool> {
    let total = count_rows(conn)?;
    Ok(id.get() > 0 && id.get() <= total)
}

struct RawMemo {
    id: i64,
    timestamp: String,
    title: String,
    body: String,
    tags: String,
}

impl RawMemo {
    fn into_memo(self) -> Result<Memo> {
        let timestamp = parse_timestamp(&self.timestamp)
            .map_err(|err| anyhow!("memo {} has a bad timestamp: {err}", self.id))?;
        Ok(Memo {
            id: MemoId(self.id),
            timestamp,
            title: self.title,
            body: self.body,
            tags: self.tags,
        })
    }
}

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMemo> {
    Ok(RawMemo {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        tags: row.get(4)?,
    })
}

fn query_memos<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Memo>> {
    let mut stmt = conn.prepare(sql).context("failed to prepare memo query")?;
    let rows = stmt.query_map(params, raw_row).context("failed to query memos")?;

    let mut memos = Vec::new();
    for row in rows {
        memos.push(row.context("failed to read memo row")?.into_memo()?);
    }
    Ok(memos)
}
