//! The member write path.
//!
//! Every statement that mutates `members` is issued from this module, and
//! always through a caller-supplied connection or transaction. The FTS5
//! triggers fire inside the same statement, so the primary row and its
//! search projection can never be observed out of step.

use chrono::{DateTime, Utc};
use clan_core::{MemberId, member::Member};
use rusqlite::Connection;

use crate::encode::{encode_id, encode_ts};

pub fn insert_member(conn: &Connection, m: &Member) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "INSERT INTO members (
       id, name, gender, generation, generation_name, father_id, mother_id,
       spouse_name, birth_date, death_date, birth_place, death_place,
       bio, portrait_path, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
  )?;
  stmt.execute(rusqlite::params![
    encode_id(m.id),
    m.name,
    m.gender.tag(),
    i64::from(m.generation),
    m.generation_name,
    m.father_id.map(encode_id),
    m.mother_id.map(encode_id),
    m.spouse_name,
    m.birth_date,
    m.death_date,
    m.birth_place,
    m.death_place,
    m.bio,
    m.portrait_path,
    encode_ts(m.created_at),
    encode_ts(m.updated_at),
  ])?;
  Ok(())
}

/// Full replace of every column except `id` and `created_at`.
///
/// Returns `false` if no row has that id.
pub fn update_member(conn: &Connection, m: &Member) -> rusqlite::Result<bool> {
  let changed = conn.execute(
    "UPDATE members SET
       name = ?2, gender = ?3, generation = ?4, generation_name = ?5,
       father_id = ?6, mother_id = ?7, spouse_name = ?8,
       birth_date = ?9, death_date = ?10, birth_place = ?11, death_place = ?12,
       bio = ?13, portrait_path = ?14, updated_at = ?15
     WHERE id = ?1",
    rusqlite::params![
      encode_id(m.id),
      m.name,
      m.gender.tag(),
      i64::from(m.generation),
      m.generation_name,
      m.father_id.map(encode_id),
      m.mother_id.map(encode_id),
      m.spouse_name,
      m.birth_date,
      m.death_date,
      m.birth_place,
      m.death_place,
      m.bio,
      m.portrait_path,
      encode_ts(m.updated_at),
    ],
  )?;
  Ok(changed > 0)
}

pub fn set_portrait(
  conn: &Connection,
  id: MemberId,
  portrait_path: &str,
  at: DateTime<Utc>,
) -> rusqlite::Result<bool> {
  let changed = conn.execute(
    "UPDATE members SET portrait_path = ?2, updated_at = ?3 WHERE id = ?1",
    rusqlite::params![encode_id(id), portrait_path, encode_ts(at)],
  )?;
  Ok(changed > 0)
}

/// Media rows go with the member via `ON DELETE CASCADE`.
pub fn delete_member(conn: &Connection, id: MemberId) -> rusqlite::Result<bool> {
  let changed = conn.execute(
    "DELETE FROM members WHERE id = ?1",
    rusqlite::params![encode_id(id)],
  )?;
  Ok(changed > 0)
}

/// Empty every data table. Run inside the load transaction.
pub fn clear_all(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    "DELETE FROM media_resources;
     DELETE FROM members;
     DELETE FROM settings;
     DELETE FROM operation_logs;",
  )
}

// ─── Lookups used to validate writes ─────────────────────────────────────────

pub fn member_exists(conn: &Connection, id: MemberId) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM members WHERE id = ?1)",
    rusqlite::params![encode_id(id)],
    |row| row.get(0),
  )
}

pub fn has_children(conn: &Connection, id: MemberId) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM members WHERE father_id = ?1)",
    rusqlite::params![encode_id(id)],
    |row| row.get(0),
  )
}

/// Whether `target` appears on the father chain starting at `start`
/// (inclusive). `UNION` keeps the walk finite even over corrupt cyclic data.
pub fn in_father_chain(
  conn: &Connection,
  start: MemberId,
  target: MemberId,
) -> rusqlite::Result<bool> {
  conn.query_row(
    "WITH RECURSIVE chain(id) AS (
       SELECT ?1
       UNION
       SELECT m.father_id FROM members m JOIN chain c ON m.id = c.id
       WHERE m.father_id IS NOT NULL
     )
     SELECT EXISTS(SELECT 1 FROM chain WHERE id = ?2)",
    rusqlite::params![encode_id(start), encode_id(target)],
    |row| row.get(0),
  )
}
