//! Opaque member identities.
//!
//! Identities are random 128-bit values (UUID v4). Generation is stateless:
//! there is no counter to share, so any number of callers, in any number of
//! processes, may generate concurrently without coordination.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity of a [`Member`](crate::member::Member).
///
/// Rendered in canonical hyphenated lowercase form, which is also how it is
/// persisted.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
  /// Generate a fresh identity.
  pub fn generate() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for MemberId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.hyphenated())
  }
}

impl FromStr for MemberId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Uuid::parse_str(s).map(Self) }
}
