//! SQL schema for the clan store.
//!
//! Everything is `IF NOT EXISTS`, so [`ensure`] may run against a fresh file
//! or an initialised one. The FTS5 projection is created separately: an
//! engine built without FTS5 still gets every other table.

use chrono::{DateTime, Utc};
use clan_core::{
  load::Warning,
  settings::{GENERATION_NAMES_KEY, default_generation_names, encode_generation_names},
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::encode::encode_ts;

/// Per-connection settings; must run outside any transaction.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Primary and bookkeeping tables.
pub const TABLES: &str = "
CREATE TABLE IF NOT EXISTS members (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    gender          TEXT,
    generation      INTEGER,
    generation_name TEXT,
    father_id       TEXT,           -- earlier member, or NULL
    mother_id       TEXT,
    spouse_name     TEXT,
    birth_date      TEXT,
    death_date      TEXT,
    birth_place     TEXT,
    death_place     TEXT,
    portrait_path   TEXT,
    bio             TEXT,
    created_at      INTEGER,        -- epoch seconds
    updated_at      INTEGER
);

CREATE TABLE IF NOT EXISTS media_resources (
    id            TEXT PRIMARY KEY,
    member_id     TEXT NOT NULL,
    resource_type TEXT NOT NULL,    -- 'video' | 'photo' | 'audio'
    file_path     TEXT NOT NULL,
    title         TEXT,
    description   TEXT,
    file_hash     TEXT,
    file_size     INTEGER,
    created_at    INTEGER,
    is_primary    BOOLEAN DEFAULT 0,
    FOREIGN KEY(member_id) REFERENCES members(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS settings (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at INTEGER
);

-- Append-only.
CREATE TABLE IF NOT EXISTS operation_logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    action      TEXT NOT NULL,
    target_type TEXT NOT NULL,
    target_id   TEXT NOT NULL,
    target_name TEXT,
    changes     TEXT,
    created_at  INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_members_father ON members(father_id);
CREATE INDEX IF NOT EXISTS idx_media_member   ON media_resources(member_id);
";

/// External-content FTS5 projection of (name, bio), keyed by `members.rowid`.
///
/// The triggers make every mutating statement on `members` carry its index
/// update with it: insert adds, delete removes, update removes the old row
/// and adds the new one.
pub const SEARCH_INDEX: &str = "
CREATE VIRTUAL TABLE IF NOT EXISTS members_fts USING fts5(
    name, bio, content='members', content_rowid='rowid'
);

CREATE TRIGGER IF NOT EXISTS members_ai AFTER INSERT ON members BEGIN
  INSERT INTO members_fts(rowid, name, bio) VALUES (new.rowid, new.name, new.bio);
END;

CREATE TRIGGER IF NOT EXISTS members_ad AFTER DELETE ON members BEGIN
  INSERT INTO members_fts(members_fts, rowid, name, bio)
  VALUES ('delete', old.rowid, old.name, old.bio);
END;

CREATE TRIGGER IF NOT EXISTS members_au AFTER UPDATE ON members BEGIN
  INSERT INTO members_fts(members_fts, rowid, name, bio)
  VALUES ('delete', old.rowid, old.name, old.bio);
  INSERT INTO members_fts(rowid, name, bio) VALUES (new.rowid, new.name, new.bio);
END;
";

/// What [`ensure`] managed to set up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
  /// Whether the FTS5 projection and its triggers exist.
  pub full_text: bool,
  pub warnings:  Vec<Warning>,
}

/// Create every schema object that is missing and seed default settings.
///
/// Errors only when a non-full-text object cannot be created. A missing FTS5
/// module and a failed settings seed become warnings in the report.
pub fn ensure(conn: &mut Connection, now: DateTime<Utc>) -> rusqlite::Result<SchemaReport> {
  conn.execute_batch(PRAGMAS)?;

  let tx = conn.transaction()?;
  tx.execute_batch(TABLES)?;
  tx.commit()?;

  let mut report = SchemaReport::default();

  match create_search_index(conn) {
    Ok(()) => report.full_text = true,
    Err(e) => {
      tracing::debug!("full-text index not created: {e}");
      report.warnings.push(Warning::FullTextUnavailable(e.to_string()));
    }
  }

  if let Err(e) = seed_settings(conn, now) {
    report.warnings.push(Warning::SettingsSeed(e.to_string()));
  }

  Ok(report)
}

/// All-or-nothing: a failure part way leaves no FTS objects behind.
fn create_search_index(conn: &mut Connection) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  tx.execute_batch(SEARCH_INDEX)?;
  tx.commit()
}

/// Insert default settings that are not present yet. Never overwrites.
///
/// Returns the number of rows actually inserted.
pub fn seed_settings(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<usize> {
  let names = encode_generation_names(&default_generation_names())
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
    rusqlite::params![GENERATION_NAMES_KEY, names, encode_ts(now)],
  )
}

/// Whether the FTS5 projection exists on this store.
pub fn has_search_index(conn: &Connection) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'members_fts'",
        [],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}
