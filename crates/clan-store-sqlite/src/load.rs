//! Bulk loading: resolve an ordered record list and insert it atomically.

use clan_core::{
  MemberId,
  load::{LoadOptions, LoadReport, Verification, Warning},
  member::timestamp_now,
  record::RawRecord,
  resolve::{AncestryResolver, Resolution},
  store::ClanStore as _,
};
use rusqlite::Connection;

use crate::{Error, Result, SqliteStore, encode::id_column, schema, write};

impl SqliteStore {
  /// Import `records` in input order.
  ///
  /// The schema is ensured first. Clearing (when requested), resolution and
  /// every insert then share one transaction: if any insert fails nothing is
  /// kept, the previous contents included, and [`Error::Import`] names the
  /// failing member.
  ///
  /// Without `clear`, fathers may also resolve to members already stored.
  pub async fn load(&self, records: Vec<RawRecord>, options: LoadOptions) -> Result<LoadReport> {
    let schema = self.ensure_schema().await?;
    let at = timestamp_now();
    let clear = options.clear;
    let rows = records.len();

    let outcome: Result<(Resolution, Vec<Warning>)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut warnings = Vec::new();

        if clear {
          write::clear_all(&tx)?;
          // The clear took the seeded settings with it.
          if let Err(e) = schema::seed_settings(&tx, at) {
            warnings.push(Warning::SettingsSeed(e.to_string()));
          }
        }

        let known = if clear { Vec::new() } else { known_names(&tx)? };
        let mut resolver = AncestryResolver::with_known(at, known);
        for record in records {
          resolver.push(record);
        }
        let resolution = resolver.finish();

        for (index, member) in resolution.members.iter().enumerate() {
          if let Err(source) = write::insert_member(&tx, member) {
            return Ok(Err(Error::Import { index, name: member.name.clone(), source }));
          }
        }

        tx.commit()?;
        Ok(Ok((resolution, warnings)))
      })
      .await?;
    let (resolution, seed_warnings) = outcome?;

    let inserted = resolution.members.len();
    tracing::debug!(rows, inserted, cleared = clear, "load committed");

    let mut warnings = schema.warnings;
    warnings.extend(seed_warnings);
    warnings.extend(resolution.warnings.into_iter().map(Warning::UnresolvedFather));

    Ok(LoadReport { inserted, cleared: clear, warnings })
  }

  /// Count stored members after a load.
  pub async fn verify(&self) -> Result<Verification> {
    Ok(Verification { members: self.count_members().await? })
  }
}

/// Existing (name, id) pairs, oldest first, so later namesakes win.
fn known_names(conn: &Connection) -> rusqlite::Result<Vec<(String, MemberId)>> {
  let mut stmt =
    conn.prepare("SELECT name, id FROM members ORDER BY created_at ASC, rowid ASC")?;
  let rows = stmt
    .query_map([], |row| {
      let name: String = row.get(0)?;
      Ok((name.trim().to_owned(), id_column(row, 1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
