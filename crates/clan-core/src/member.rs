//! Members — the person records of the genealogy.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, id::MemberId};

/// Current time truncated to whole seconds, the resolution the store keeps.
pub fn timestamp_now() -> DateTime<Utc> { Utc::now().trunc_subsecs(0) }

// ─── Gender ──────────────────────────────────────────────────────────────────

/// Gender tag. Stored as `M` / `F`; any other tag is kept verbatim, case and
/// padding included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  #[default]
  Male,
  Female,
  Other(String),
}

impl Gender {
  /// Interpret a raw tag. Blank input yields the default.
  pub fn from_tag(tag: &str) -> Self {
    match tag {
      "M" => Self::Male,
      "F" => Self::Female,
      blank if blank.trim().is_empty() => Self::Male,
      other => Self::Other(other.to_owned()),
    }
  }

  pub fn tag(&self) -> &str {
    match self {
      Self::Male => "M",
      Self::Female => "F",
      Self::Other(tag) => tag,
    }
  }
}

// ─── Member ──────────────────────────────────────────────────────────────────

/// A person record.
///
/// `generation` is advisory metadata: nothing checks it against the father's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub id:              MemberId,
  pub name:            String,
  pub gender:          Gender,
  pub generation:      u32,
  /// Label of this generation within the naming cycle.
  pub generation_name: String,
  pub father_id:       Option<MemberId>,
  pub mother_id:       Option<MemberId>,
  /// Free text; spouses are not members.
  pub spouse_name:     String,
  pub birth_date:      String,
  pub death_date:      String,
  pub birth_place:     String,
  pub death_place:     String,
  /// Markdown-like biography; indexed for full-text search with `name`.
  pub bio:             String,
  pub portrait_path:   String,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Member {
  /// Build a member from caller input, assigning `id` and both timestamps.
  pub fn from_new(id: MemberId, input: NewMember, at: DateTime<Utc>) -> Self {
    Self {
      id,
      name: input.name,
      gender: input.gender,
      generation: input.generation,
      generation_name: input.generation_name,
      father_id: input.father_id,
      mother_id: input.mother_id,
      spouse_name: input.spouse_name,
      birth_date: input.birth_date,
      death_date: input.death_date,
      birth_place: input.birth_place,
      death_place: input.death_place,
      bio: input.bio,
      portrait_path: input.portrait_path,
      created_at: at,
      updated_at: at,
    }
  }

  /// Structural checks that need no store access.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    if self.father_id == Some(self.id) {
      return Err(Error::SelfFather(self.id));
    }
    Ok(())
  }
}

/// Input for creating a member through the store; the store assigns the id
/// and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
  pub name:            String,
  #[serde(default)]
  pub gender:          Gender,
  #[serde(default = "first_generation")]
  pub generation:      u32,
  #[serde(default)]
  pub generation_name: String,
  #[serde(default)]
  pub father_id:       Option<MemberId>,
  #[serde(default)]
  pub mother_id:       Option<MemberId>,
  #[serde(default)]
  pub spouse_name:     String,
  #[serde(default)]
  pub birth_date:      String,
  #[serde(default)]
  pub death_date:      String,
  #[serde(default)]
  pub birth_place:     String,
  #[serde(default)]
  pub death_place:     String,
  #[serde(default)]
  pub bio:             String,
  #[serde(default)]
  pub portrait_path:   String,
}

fn first_generation() -> u32 { 1 }

impl NewMember {
  /// A first-generation male member with every optional field empty.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:            name.into(),
      gender:          Gender::default(),
      generation:      first_generation(),
      generation_name: String::new(),
      father_id:       None,
      mother_id:       None,
      spouse_name:     String::new(),
      birth_date:      String::new(),
      death_date:      String::new(),
      birth_place:     String::new(),
      death_place:     String::new(),
      bio:             String::new(),
      portrait_path:   String::new(),
    }
  }
}
