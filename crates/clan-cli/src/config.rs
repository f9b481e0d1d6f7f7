//! Where the store and the record list live.
//!
//! Precedence, highest first: command-line flags, `CLAN_*` environment
//! variables, the optional TOML config file, built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const ORG_NAME: &str = "dong-xiong-community";
pub const APP_NAME: &str = "clan-memory";
pub const DB_FILE: &str = "clan.db";
pub const CSV_FILE: &str = "clan_data.csv";

/// Shape of the optional config file (and of `CLAN_DB_PATH` / `CLAN_CSV_PATH`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportConfig {
  #[serde(default)]
  pub db_path:  Option<PathBuf>,
  #[serde(default)]
  pub csv_path: Option<PathBuf>,
}

impl ImportConfig {
  /// Layer `file` (if it exists) under the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("CLAN"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise ImportConfig")
  }

  pub fn db_path(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match flag.or_else(|| self.db_path.clone()) {
      Some(path) => Ok(expand_tilde(&path)),
      None => default_db_path(),
    }
  }

  pub fn csv_path(&self, flag: Option<PathBuf>) -> PathBuf {
    flag
      .or_else(|| self.csv_path.clone())
      .map(|p| expand_tilde(&p))
      .unwrap_or_else(default_csv_path)
  }
}

/// `<data dir>/dong-xiong-community/clan-memory/clan.db`.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
  let data = dirs::data_dir().context("could not determine the user data directory")?;
  Ok(data.join(ORG_NAME).join(APP_NAME).join(DB_FILE))
}

/// `clan_data.csv` next to the executable, or in the working directory when
/// the executable's location is unknown.
pub fn default_csv_path() -> PathBuf {
  std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(Path::to_path_buf))
    .unwrap_or_else(|| PathBuf::from("."))
    .join(CSV_FILE)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
