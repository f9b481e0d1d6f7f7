//! `clan-init` — create and populate a clan genealogy store.
//!
//! # Usage
//!
//! ```text
//! clan-init schema
//! clan-init import --csv clan_data.csv --clear
//! clan-init --db ~/clan.db verify
//! ```
//!
//! Progress and warnings go to stdout. A failed import is rolled back in full
//! and the process exits non-zero.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clan_core::load::{LoadOptions, LoadReport, Verification};
use clan_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ImportConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Initialise and populate a clan genealogy store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "clan.toml")]
  config: PathBuf,

  /// Store location (default: <data dir>/dong-xiong-community/clan-memory/clan.db).
  #[arg(long, global = true, value_name = "FILE")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create any missing tables, indexes and the full-text index.
  Schema,

  /// Import a CSV record list. Fathers must appear before their children.
  Import {
    /// Record list (default: clan_data.csv next to this executable).
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Delete all existing members, media, settings and logs first.
    #[arg(long)]
    clear: bool,
  },

  /// Print the number of stored members. The store must already exist.
  Verify,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ImportConfig::load(&cli.config)?;
  let db_path = cfg.db_path(cli.db)?;

  match cli.command {
    Command::Schema => schema(&db_path).await,
    Command::Import { csv, clear } => import(&db_path, &cfg.csv_path(csv), clear).await,
    Command::Verify => verify(&db_path).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn open_store(db_path: &Path) -> anyhow::Result<SqliteStore> {
  tracing::info!("opening store at {}", db_path.display());
  SqliteStore::open(db_path)
    .await
    .with_context(|| format!("failed to open store at {}", db_path.display()))
}

async fn schema(db_path: &Path) -> anyhow::Result<()> {
  let store = open_store(db_path).await?;
  let report = store.schema_report();

  for warning in &report.warnings {
    tracing::warn!("{warning}");
  }
  tracing::info!(full_text = report.full_text, "schema ready");
  Ok(())
}

async fn import(db_path: &Path, csv_path: &Path, clear: bool) -> anyhow::Result<()> {
  // Read the whole record list before touching the store.
  tracing::info!("reading records from {}", csv_path.display());
  let records = clan_csv::read_path(csv_path)
    .with_context(|| format!("failed to read {}", csv_path.display()))?;
  tracing::info!(rows = records.len(), "record list read");

  let store = open_store(db_path).await?;
  if clear {
    tracing::warn!("clearing existing members, media, settings and operation logs");
  }

  let report = match store.load(records, LoadOptions { clear }).await {
    Ok(report) => report,
    Err(e) => {
      tracing::error!("import failed, no changes were kept: {e}");
      return Err(e).context("import failed");
    }
  };

  for warning in &report.warnings {
    tracing::warn!("{warning}");
  }
  tracing::info!("imported {} members", report.inserted);

  report_verification(&store, &report).await;
  Ok(())
}

/// Advisory only: a failure here never undoes the committed load.
async fn report_verification(store: &SqliteStore, report: &LoadReport) {
  let verified = store.verify().await;
  if let Ok(v) = &verified {
    tracing::info!("total members in store: {}", v.members);
  }
  if let Some(msg) = verification_warning(verified, report) {
    tracing::warn!("{msg}");
  }
}

/// The warning, if any, a post-import check produces. Never an error.
fn verification_warning(
  verified: clan_store_sqlite::Result<Verification>,
  report: &LoadReport,
) -> Option<String> {
  match verified {
    Ok(v) => v.reconcile(report).err().map(|msg| format!("count mismatch: {msg}")),
    Err(e) => Some(format!("verification failed: {e}")),
  }
}

async fn verify(db_path: &Path) -> anyhow::Result<()> {
  // Opening would create the file and its schema.
  anyhow::ensure!(db_path.is_file(), "no store at {}", db_path.display());

  let store = open_store(db_path).await?;
  let v = store.verify().await.context("failed to count members")?;
  println!("{}", v.members);
  Ok(())
}
