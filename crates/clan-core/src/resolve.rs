//! Ancestry resolution: turning name-linked rows into id-linked members.
//!
//! Resolution is a single ordered pass over the input with an incremental
//! symbol table from name to assigned identity. A father can only be found
//! if his row came *before* the child's row; order of appearance is part of
//! the input contract.
//!
//! The father lookup happens before the current row's own name is entered
//! into the table. A row naming itself as father therefore links to an
//! earlier namesake, or to nobody. Every resolved father precedes his child,
//! so the resulting graph cannot contain a cycle.

use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};

use crate::{
  id::MemberId,
  member::{Gender, Member},
  record::RawRecord,
};

/// A father name that matched no earlier row. The child is still created,
/// with no father link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedFather {
  pub father: String,
  pub child:  String,
}

impl fmt::Display for UnresolvedFather {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "father '{}' not found for '{}' (fathers must appear before their children)",
      self.father, self.child
    )
  }
}

/// Output of a completed pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
  pub members:  Vec<Member>,
  pub warnings: Vec<UnresolvedFather>,
}

/// Incremental resolver; feed rows in input order with [`push`](Self::push).
pub struct AncestryResolver {
  by_name:  HashMap<String, MemberId>,
  at:       DateTime<Utc>,
  members:  Vec<Member>,
  warnings: Vec<UnresolvedFather>,
}

impl AncestryResolver {
  /// `at` becomes both timestamps of every resolved member.
  pub fn new(at: DateTime<Utc>) -> Self {
    Self {
      by_name: HashMap::new(),
      at,
      members: Vec::new(),
      warnings: Vec::new(),
    }
  }

  /// Start with names that already exist in the store, oldest first; later
  /// entries shadow earlier ones with the same name.
  pub fn with_known(
    at: DateTime<Utc>,
    known: impl IntoIterator<Item = (String, MemberId)>,
  ) -> Self {
    let mut resolver = Self::new(at);
    resolver.by_name.extend(known);
    resolver
  }

  /// Resolve one row. Returns `None` (and consumes no identity) when the
  /// trimmed name is empty.
  pub fn push(&mut self, record: RawRecord) -> Option<&Member> {
    let name = record.name.trim();
    if name.is_empty() {
      return None;
    }
    let name = name.to_owned();
    let id = MemberId::generate();

    let father_id = match non_blank(record.father_name.as_deref()) {
      Some(father) => match self.by_name.get(father) {
        Some(&father_id) => Some(father_id),
        None => {
          self.warnings.push(UnresolvedFather {
            father: father.to_owned(),
            child:  name.clone(),
          });
          None
        }
      },
      None => None,
    };

    self.by_name.insert(name.clone(), id);

    self.members.push(Member {
      id,
      name,
      gender: record.gender.as_deref().map(Gender::from_tag).unwrap_or_default(),
      generation: parse_generation(record.generation.as_deref()),
      generation_name: record.generation_name.unwrap_or_default(),
      father_id,
      mother_id: None,
      spouse_name: record.spouse.unwrap_or_default(),
      birth_date: record.birth_date.unwrap_or_default(),
      death_date: record.death_date.unwrap_or_default(),
      birth_place: record.birth_place.unwrap_or_default(),
      death_place: record.death_place.unwrap_or_default(),
      bio: record.bio.unwrap_or_default(),
      portrait_path: record.portrait_path.unwrap_or_default(),
      created_at: self.at,
      updated_at: self.at,
    });
    self.members.last()
  }

  pub fn finish(self) -> Resolution {
    Resolution { members: self.members, warnings: self.warnings }
  }
}

/// Resolve a whole record list against an empty symbol table.
pub fn resolve(
  records: impl IntoIterator<Item = RawRecord>,
  at: DateTime<Utc>,
) -> Resolution {
  let mut resolver = AncestryResolver::new(at);
  for record in records {
    resolver.push(record);
  }
  resolver.finish()
}

/// Generation ordinal; `1` for blank, unparseable or non-positive input.
pub fn parse_generation(raw: Option<&str>) -> u32 {
  raw
    .map(str::trim)
    .and_then(|s| s.parse::<u32>().ok())
    .filter(|&g| g >= 1)
    .unwrap_or(1)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|s| !s.is_empty())
}
