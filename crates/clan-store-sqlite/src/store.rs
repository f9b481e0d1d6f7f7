//! [`SqliteStore`] — the SQLite implementation of [`ClanStore`].

use std::path::Path;

use clan_core::{
  Error as CoreError, MemberId,
  media::{MediaKind, MediaResource, NewMediaResource, NewOperationLog, OperationLog},
  member::{Member, NewMember, timestamp_now},
  settings::{GENERATION_NAMES_KEY, decode_generation_names, default_generation_names},
  store::ClanStore,
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    MEDIA_COLUMNS, MEMBER_COLUMNS, RawLog, RawMedia, RawMember, decode_ts, encode_action,
    encode_id, encode_media_kind, encode_ts, encode_uuid, fts_phrase, like_pattern,
  },
  schema::{self, SchemaReport},
  write,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A clan genealogy store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  schema:          SchemaReport,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and ensure the schema exists.
  ///
  /// Missing parent directories are created.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let mut store = Self { conn, schema: SchemaReport::default() };
    store.schema = store.ensure_schema().await?;
    Ok(store)
  }

  /// Create any missing schema objects and seed default settings.
  ///
  /// Safe to call any number of times. Fails only if a non-full-text object
  /// cannot be created.
  pub async fn ensure_schema(&self) -> Result<SchemaReport> {
    let now = timestamp_now();
    let report = self
      .conn
      .call(move |conn| Ok(schema::ensure(conn, now)?))
      .await
      .map_err(Error::Schema)?;
    tracing::debug!(full_text = report.full_text, "schema ensured");
    Ok(report)
  }

  /// The schema report produced when this store was opened.
  pub fn schema_report(&self) -> &SchemaReport { &self.schema }

  /// Re-derive the whole FTS5 projection from `members`.
  ///
  /// Returns `false` when the store has no full-text index.
  pub async fn rebuild_search_index(&self) -> Result<bool> {
    let rebuilt = self
      .conn
      .call(|conn| {
        if !schema::has_search_index(conn)? {
          return Ok(false);
        }
        conn.execute("INSERT INTO members_fts(members_fts) VALUES ('rebuild')", [])?;
        Ok(true)
      })
      .await?;
    Ok(rebuilt)
  }

  async fn query_members(
    &self,
    sql: String,
    param: Option<String>,
  ) -> Result<Vec<Member>> {
    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawMember::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawMember::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }
}

// ─── ClanStore impl ──────────────────────────────────────────────────────────

impl ClanStore for SqliteStore {
  type Error = Error;

  // ── Members ───────────────────────────────────────────────────────────────

  async fn add_member(&self, input: NewMember) -> Result<Member> {
    let member = Member::from_new(MemberId::generate(), input, timestamp_now());
    member.validate()?;

    let row = member.clone();
    let outcome: Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(father) = row.father_id
          && !write::member_exists(&tx, father)?
        {
          return Ok(Err(CoreError::UnknownFather(father)));
        }
        write::insert_member(&tx, &row)?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    outcome?;

    Ok(member)
  }

  async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members m WHERE m.id = ?1");
    let mut found = self.query_members(sql, Some(encode_id(id))).await?;
    Ok(found.pop())
  }

  async fn list_members(&self) -> Result<Vec<Member>> {
    let sql = format!(
      "SELECT {MEMBER_COLUMNS} FROM members m
       ORDER BY m.generation ASC, m.created_at ASC, m.rowid ASC"
    );
    self.query_members(sql, None).await
  }

  async fn update_member(&self, mut member: Member) -> Result<Member> {
    member.validate()?;
    member.updated_at = timestamp_now();

    let row = member.clone();
    let outcome: Result<i64, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let created_at: Option<Option<f64>> = tx
          .query_row(
            "SELECT created_at FROM members WHERE id = ?1",
            rusqlite::params![encode_id(row.id)],
            |r| r.get(0),
          )
          .optional()?;
        let Some(created_at) = created_at else {
          return Ok(Err(CoreError::MemberNotFound(row.id)));
        };

        if let Some(father) = row.father_id {
          if !write::member_exists(&tx, father)? {
            return Ok(Err(CoreError::UnknownFather(father)));
          }
          if write::in_father_chain(&tx, father, row.id)? {
            return Ok(Err(CoreError::AncestryCycle { child: row.id, father }));
          }
        }

        write::update_member(&tx, &row)?;
        tx.commit()?;
        Ok(Ok(created_at.unwrap_or_default() as i64))
      })
      .await?;

    member.created_at = decode_ts(outcome?)?;
    Ok(member)
  }

  async fn set_portrait(&self, id: MemberId, portrait_path: String) -> Result<bool> {
    let now = timestamp_now();
    let changed = self
      .conn
      .call(move |conn| Ok(write::set_portrait(conn, id, &portrait_path, now)?))
      .await?;
    Ok(changed)
  }

  async fn delete_member(&self, id: MemberId) -> Result<bool> {
    let outcome: Result<bool, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if write::has_children(&tx, id)? {
          return Ok(Err(CoreError::HasChildren(id)));
        }
        let deleted = write::delete_member(&tx, id)?;
        tx.commit()?;
        Ok(Ok(deleted))
      })
      .await?;
    Ok(outcome?)
  }

  async fn has_children(&self, id: MemberId) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| Ok(write::has_children(conn, id)?))
      .await?;
    Ok(found)
  }

  async fn count_members(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT count(*) FROM members", [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn search_members(&self, text: String) -> Result<Vec<Member>> {
    let text = text.trim().to_owned();
    if text.is_empty() {
      return Ok(Vec::new());
    }

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let (sql, param) = if schema::has_search_index(conn)? {
          (
            format!(
              "SELECT {MEMBER_COLUMNS} FROM members m
               JOIN members_fts f ON m.rowid = f.rowid
               WHERE members_fts MATCH ?1
               ORDER BY rank"
            ),
            fts_phrase(&text),
          )
        } else {
          (
            format!(
              "SELECT {MEMBER_COLUMNS} FROM members m
               WHERE m.name LIKE ?1 ESCAPE '\\' OR m.bio LIKE ?1 ESCAPE '\\'
               ORDER BY m.generation ASC, m.rowid ASC"
            ),
            like_pattern(&text),
          )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![param], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  // ── Media ─────────────────────────────────────────────────────────────────

  async fn add_media(&self, input: NewMediaResource) -> Result<MediaResource> {
    let media = MediaResource {
      id:          Uuid::new_v4(),
      member_id:   input.member_id,
      kind:        input.kind,
      file_path:   input.file_path,
      title:       input.title,
      description: input.description,
      file_hash:   input.file_hash,
      file_size:   input.file_size,
      created_at:  timestamp_now(),
      is_primary:  input.is_primary,
    };

    let id_str        = encode_uuid(media.id);
    let member_id     = media.member_id;
    let kind_str      = encode_media_kind(media.kind);
    let file_path     = media.file_path.clone();
    let title         = media.title.clone();
    let description   = media.description.clone();
    let file_hash     = media.file_hash.clone();
    let file_size     = i64::try_from(media.file_size).unwrap_or(i64::MAX);
    let created_at    = encode_ts(media.created_at);
    let is_primary    = media.is_primary;

    let outcome: Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        if !write::member_exists(conn, member_id)? {
          return Ok(Err(CoreError::MemberNotFound(member_id)));
        }
        conn.execute(
          "INSERT INTO media_resources (
             id, member_id, resource_type, file_path, title, description,
             file_hash, file_size, created_at, is_primary
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            encode_id(member_id),
            kind_str,
            file_path,
            title,
            description,
            file_hash,
            file_size,
            created_at,
            is_primary,
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;
    outcome?;

    Ok(media)
  }

  async fn delete_media(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM media_resources WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_media(
    &self,
    member_id: MemberId,
    kind: Option<MediaKind>,
  ) -> Result<Vec<MediaResource>> {
    let member_str = encode_id(member_id);
    let kind_str   = kind.map(encode_media_kind);

    let raws: Vec<RawMedia> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEDIA_COLUMNS} FROM media_resources
           WHERE member_id = ?1 AND (?2 IS NULL OR resource_type = ?2)
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![member_str, kind_str], RawMedia::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMedia::into_media).collect()
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn get_setting(&self, key: String) -> Result<Option<String>> {
    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM settings WHERE key = ?1",
              rusqlite::params![key],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn put_setting(&self, key: String, value: String) -> Result<()> {
    let at = encode_ts(timestamp_now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![key, value, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn generation_names(&self) -> Result<Vec<String>> {
    match self.get_setting(GENERATION_NAMES_KEY.to_owned()).await? {
      Some(raw) => Ok(decode_generation_names(&raw)?),
      None => Ok(default_generation_names()),
    }
  }

  // ── Operation log ─────────────────────────────────────────────────────────

  async fn append_log(&self, entry: NewOperationLog) -> Result<OperationLog> {
    let created_at  = timestamp_now();
    let action_str  = encode_action(entry.action);
    let changes_str = serde_json::to_string(&entry.changes)?;
    let target_type = entry.target_type.clone();
    let target_id   = entry.target_id.clone();
    let target_name = entry.target_name.clone();
    let at          = encode_ts(created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO operation_logs (
             action, target_type, target_id, target_name, changes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![action_str, target_type, target_id, target_name, changes_str, at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(OperationLog {
      id,
      action: entry.action,
      target_type: entry.target_type,
      target_id: entry.target_id,
      target_name: entry.target_name,
      changes: entry.changes,
      created_at,
    })
  }

  async fn list_logs(&self, limit: usize, offset: usize) -> Result<Vec<OperationLog>> {
    let limit_val  = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(offset).unwrap_or(i64::MAX);

    let raws: Vec<RawLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, action, target_type, target_id, target_name, changes, created_at
           FROM operation_logs
           ORDER BY id DESC
           LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], RawLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLog::into_log).collect()
  }
}
