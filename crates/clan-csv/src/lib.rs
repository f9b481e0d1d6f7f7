//! Reader for the clan record list.
//!
//! The record list is a CSV file with a header row. Only the `Name` column
//! is required; every other column may be absent, and extra columns are
//! ignored. Rows come back in file order, which matters: a father must
//! appear before his children.
//!
//! # Quick start
//!
//! ```no_run
//! let records = clan_csv::read_path("clan_data.csv").unwrap();
//! println!("{} rows", records.len());
//! ```

pub mod error;
mod parse;

use std::{io::Read, path::Path};

use clan_core::record::RawRecord;
pub use error::{Error, Result};

/// Header of the one column a record list must have.
pub const NAME_COLUMN: &str = "Name";

/// Read every row of the record list at `path`.
pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
  let path = path.as_ref();
  if !path.is_file() {
    return Err(Error::NotFound(path.to_path_buf()));
  }
  let text = std::fs::read_to_string(path)?;
  parse::parse_str(&text)
}

/// Read every row from an arbitrary UTF-8 source.
pub fn read(mut input: impl Read) -> Result<Vec<RawRecord>> {
  let mut text = String::new();
  input.read_to_string(&mut text)?;
  parse::parse_str(&text)
}
