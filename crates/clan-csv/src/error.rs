//! Error types for the clan-csv reader.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("record list not found: {0}")]
  NotFound(PathBuf),

  #[error("record list is missing the required {0:?} column")]
  MissingColumn(&'static str),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
