//! Header-driven CSV decoding into [`RawRecord`]s.

use clan_core::record::RawRecord;
use serde::Deserialize;

use crate::{Error, NAME_COLUMN, Result};

/// One CSV row keyed by header name. Empty cells decode as `None`.
#[derive(Debug, Deserialize)]
struct Row {
  #[serde(rename = "Name", default)]
  name:            String,
  #[serde(rename = "FatherName", default)]
  father_name:     Option<String>,
  #[serde(rename = "Gender", default)]
  gender:          Option<String>,
  #[serde(rename = "Generation", default)]
  generation:      Option<String>,
  #[serde(rename = "GenerationName", default)]
  generation_name: Option<String>,
  #[serde(rename = "Spouse", default)]
  spouse:          Option<String>,
  #[serde(rename = "BirthDate", default)]
  birth_date:      Option<String>,
  #[serde(rename = "DeathDate", default)]
  death_date:      Option<String>,
  #[serde(rename = "BirthPlace", default)]
  birth_place:     Option<String>,
  #[serde(rename = "DeathPlace", default)]
  death_place:     Option<String>,
  #[serde(rename = "Bio", default)]
  bio:             Option<String>,
  #[serde(rename = "PortraitPath", default)]
  portrait_path:   Option<String>,
}

impl From<Row> for RawRecord {
  fn from(row: Row) -> Self {
    RawRecord {
      name:            row.name,
      father_name:     row.father_name,
      gender:          row.gender,
      generation:      row.generation,
      generation_name: row.generation_name,
      spouse:          row.spouse,
      birth_date:      row.birth_date,
      death_date:      row.death_date,
      birth_place:     row.birth_place,
      death_place:     row.death_place,
      bio:             row.bio,
      portrait_path:   row.portrait_path,
    }
  }
}

pub fn parse_str(text: &str) -> Result<Vec<RawRecord>> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);

  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::Headers)
    .from_reader(text.as_bytes());

  if !reader.headers()?.iter().any(|h| h == NAME_COLUMN) {
    return Err(Error::MissingColumn(NAME_COLUMN));
  }

  reader
    .deserialize::<Row>()
    .map(|row| Ok(row?.into()))
    .collect()
}
