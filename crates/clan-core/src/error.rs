//! Error types for `clan-core`.

use thiserror::Error;

use crate::id::MemberId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("member name must not be empty")]
  EmptyName,

  #[error("member not found: {0}")]
  MemberNotFound(MemberId),

  #[error("father {0} does not exist")]
  UnknownFather(MemberId),

  #[error("member {0} cannot be its own father")]
  SelfFather(MemberId),

  #[error("making {father} the father of {child} would create an ancestry cycle")]
  AncestryCycle { child: MemberId, father: MemberId },

  #[error("member {0} still has children referencing it")]
  HasChildren(MemberId),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
