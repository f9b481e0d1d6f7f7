//! Options and outcome types for a bulk load.

use std::fmt;

use crate::resolve::UnresolvedFather;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
  /// Delete all members, media, settings and operation logs before
  /// inserting. Irreversible once the load commits.
  pub clear: bool,
}

/// A recoverable problem encountered while preparing or running a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
  UnresolvedFather(UnresolvedFather),
  /// The storage engine has no full-text support; search indexing is off.
  FullTextUnavailable(String),
  /// A default setting could not be seeded.
  SettingsSeed(String),
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnresolvedFather(w) => fmt::Display::fmt(w, f),
      Self::FullTextUnavailable(msg) => {
        write!(f, "full-text search unavailable, index skipped: {msg}")
      }
      Self::SettingsSeed(msg) => write!(f, "could not seed default settings: {msg}"),
    }
  }
}

/// Result of a committed load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub inserted: usize,
  pub cleared:  bool,
  pub warnings: Vec<Warning>,
}

/// Post-load member count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
  pub members: u64,
}

impl Verification {
  /// Check the stored total against what the load reported inserting.
  ///
  /// After a clearing load the total must match exactly; otherwise it must
  /// be at least the inserted count.
  pub fn reconcile(&self, report: &LoadReport) -> Result<(), String> {
    let inserted = report.inserted as u64;
    let ok = if report.cleared {
      self.members == inserted
    } else {
      self.members >= inserted
    };
    if ok {
      Ok(())
    } else {
      Err(format!(
        "store holds {} members but the load inserted {}",
        self.members, inserted
      ))
    }
  }
}
