//! Error type for `clan-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] clan_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A non-full-text schema object could not be created.
  #[error("schema creation failed: {0}")]
  Schema(#[source] tokio_rusqlite::Error),

  /// The bulk insert failed and was rolled back; nothing from the batch was
  /// kept.
  #[error("import rolled back at member #{index} ({name:?}): {source}")]
  Import {
    /// Zero-based position among the resolved members.
    index:  usize,
    name:   String,
    #[source]
    source: rusqlite::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("cannot decode stored value: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
