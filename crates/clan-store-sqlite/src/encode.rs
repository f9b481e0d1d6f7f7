//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are epoch seconds. Identities are hyphenated lowercase UUID
//! strings. Free-text member fields are nullable in the schema and decode to
//! empty strings.

use chrono::{DateTime, Utc};
use clan_core::{
  MemberId,
  media::{LogAction, MediaKind, MediaResource, OperationLog},
  member::{Gender, Member},
};
use rusqlite::{Row, types::Type};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: MemberId) -> String { id.to_string() }

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

/// Optional id column; blank legacy values count as absent.
pub fn decode_opt_id(s: Option<&str>) -> Result<Option<MemberId>> {
  s.map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::parse::<MemberId>)
    .transpose()
    .map_err(Error::Uuid)
}

/// Read a member id straight out of a row, for use inside `conn.call`.
pub fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<MemberId> {
  let raw: String = row.get(idx)?;
  raw
    .parse()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

pub fn decode_ts(secs: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0)
    .ok_or_else(|| Error::Decode(format!("timestamp out of range: {secs}")))
}

// ─── MediaKind ───────────────────────────────────────────────────────────────

pub fn encode_media_kind(k: MediaKind) -> &'static str {
  match k {
    MediaKind::Video => "video",
    MediaKind::Photo => "photo",
    MediaKind::Audio => "audio",
  }
}

pub fn decode_media_kind(s: &str) -> Result<MediaKind> {
  match s {
    "video" => Ok(MediaKind::Video),
    "photo" => Ok(MediaKind::Photo),
    "audio" => Ok(MediaKind::Audio),
    other => Err(Error::Decode(format!("unknown resource type: {other:?}"))),
  }
}

// ─── LogAction ───────────────────────────────────────────────────────────────

pub fn encode_action(a: LogAction) -> &'static str {
  match a {
    LogAction::Create => "CREATE",
    LogAction::Update => "UPDATE",
    LogAction::Delete => "DELETE",
  }
}

pub fn decode_action(s: &str) -> Result<LogAction> {
  match s {
    "CREATE" => Ok(LogAction::Create),
    "UPDATE" => Ok(LogAction::Update),
    "DELETE" => Ok(LogAction::Delete),
    other => Err(Error::Decode(format!("unknown log action: {other:?}"))),
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Quote free text as a single FTS5 phrase so operators in it are inert.
pub fn fts_phrase(text: &str) -> String { format!("\"{}\"", text.replace('"', "\"\"")) }

/// `LIKE` pattern matching `text` anywhere; use with `ESCAPE '\'`.
pub fn like_pattern(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + 2);
  escaped.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawMember::from_row`]; `members` must be aliased `m`.
pub const MEMBER_COLUMNS: &str = "m.id, m.name, m.gender, m.generation, m.generation_name,
   m.father_id, m.mother_id, m.spouse_name, m.birth_date, m.death_date,
   m.birth_place, m.death_place, m.bio, m.portrait_path, m.created_at, m.updated_at";

/// Raw values read directly from a `members` row.
pub struct RawMember {
  pub id:              String,
  pub name:            String,
  pub gender:          Option<String>,
  pub generation:      Option<i64>,
  pub generation_name: Option<String>,
  pub father_id:       Option<String>,
  pub mother_id:       Option<String>,
  pub spouse_name:     Option<String>,
  pub birth_date:      Option<String>,
  pub death_date:      Option<String>,
  pub birth_place:     Option<String>,
  pub death_place:     Option<String>,
  pub bio:             Option<String>,
  pub portrait_path:   Option<String>,
  // Older importers wrote fractional seconds; REAL and INTEGER both read.
  pub created_at:      Option<f64>,
  pub updated_at:      Option<f64>,
}

impl RawMember {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      name:            row.get(1)?,
      gender:          row.get(2)?,
      generation:      row.get(3)?,
      generation_name: row.get(4)?,
      father_id:       row.get(5)?,
      mother_id:       row.get(6)?,
      spouse_name:     row.get(7)?,
      birth_date:      row.get(8)?,
      death_date:      row.get(9)?,
      birth_place:     row.get(10)?,
      death_place:     row.get(11)?,
      bio:             row.get(12)?,
      portrait_path:   row.get(13)?,
      created_at:      row.get(14)?,
      updated_at:      row.get(15)?,
    })
  }

  pub fn into_member(self) -> Result<Member> {
    let created_at = decode_ts(self.created_at.unwrap_or_default() as i64)?;
    let updated_at = match self.updated_at {
      Some(secs) => decode_ts(secs as i64)?,
      None => created_at,
    };

    Ok(Member {
      id: self.id.parse()?,
      name: self.name,
      gender: self
        .gender
        .as_deref()
        .map(Gender::from_tag)
        .unwrap_or_default(),
      generation: self
        .generation
        .and_then(|g| u32::try_from(g).ok())
        .filter(|&g| g >= 1)
        .unwrap_or(1),
      generation_name: self.generation_name.unwrap_or_default(),
      father_id: decode_opt_id(self.father_id.as_deref())?,
      mother_id: decode_opt_id(self.mother_id.as_deref())?,
      spouse_name: self.spouse_name.unwrap_or_default(),
      birth_date: self.birth_date.unwrap_or_default(),
      death_date: self.death_date.unwrap_or_default(),
      birth_place: self.birth_place.unwrap_or_default(),
      death_place: self.death_place.unwrap_or_default(),
      bio: self.bio.unwrap_or_default(),
      portrait_path: self.portrait_path.unwrap_or_default(),
      created_at,
      updated_at,
    })
  }
}

pub const MEDIA_COLUMNS: &str = "id, member_id, resource_type, file_path, title, description,
   file_hash, file_size, created_at, is_primary";

/// Raw values read directly from a `media_resources` row.
pub struct RawMedia {
  pub id:          String,
  pub member_id:   String,
  pub kind:        String,
  pub file_path:   String,
  pub title:       Option<String>,
  pub description: Option<String>,
  pub file_hash:   Option<String>,
  pub file_size:   Option<i64>,
  pub created_at:  Option<i64>,
  pub is_primary:  Option<bool>,
}

impl RawMedia {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      member_id:   row.get(1)?,
      kind:        row.get(2)?,
      file_path:   row.get(3)?,
      title:       row.get(4)?,
      description: row.get(5)?,
      file_hash:   row.get(6)?,
      file_size:   row.get(7)?,
      created_at:  row.get(8)?,
      is_primary:  row.get(9)?,
    })
  }

  pub fn into_media(self) -> Result<MediaResource> {
    Ok(MediaResource {
      id:          Uuid::parse_str(&self.id)?,
      member_id:   self.member_id.parse()?,
      kind:        decode_media_kind(&self.kind)?,
      file_path:   self.file_path,
      title:       self.title.unwrap_or_default(),
      description: self.description,
      file_hash:   self.file_hash,
      file_size:   self
        .file_size
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0),
      created_at:  decode_ts(self.created_at.unwrap_or_default())?,
      is_primary:  self.is_primary.unwrap_or(false),
    })
  }
}

/// Raw values read directly from an `operation_logs` row.
pub struct RawLog {
  pub id:          i64,
  pub action:      String,
  pub target_type: String,
  pub target_id:   String,
  pub target_name: Option<String>,
  pub changes:     Option<String>,
  pub created_at:  i64,
}

impl RawLog {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      action:      row.get(1)?,
      target_type: row.get(2)?,
      target_id:   row.get(3)?,
      target_name: row.get(4)?,
      changes:     row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_log(self) -> Result<OperationLog> {
    let changes = match self.changes.as_deref() {
      Some(s) if !s.trim().is_empty() => serde_json::from_str(s)?,
      _ => serde_json::Value::Null,
    };

    Ok(OperationLog {
      id: self.id,
      action: decode_action(&self.action)?,
      target_type: self.target_type,
      target_id: self.target_id,
      target_name: self.target_name,
      changes,
      created_at: decode_ts(self.created_at)?,
    })
  }
}
