//! Media resources and the operation log: bookkeeping records that hang off
//! members but play no part in import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::MemberId;

// ─── Media ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
  Video,
  Photo,
  Audio,
}

/// A file attached to exactly one member; deleted together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResource {
  pub id:          Uuid,
  pub member_id:   MemberId,
  pub kind:        MediaKind,
  /// Relative to the application's resources directory.
  pub file_path:   String,
  pub title:       String,
  pub description: Option<String>,
  pub file_hash:   Option<String>,
  pub file_size:   u64,
  pub created_at:  DateTime<Utc>,
  pub is_primary:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMediaResource {
  pub member_id:   MemberId,
  pub kind:        MediaKind,
  pub file_path:   String,
  pub title:       String,
  pub description: Option<String>,
  pub file_hash:   Option<String>,
  pub file_size:   u64,
  pub is_primary:  bool,
}

// ─── Operation log ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogAction {
  Create,
  Update,
  Delete,
}

/// One append-only audit entry. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
  pub id:          i64,
  pub action:      LogAction,
  /// e.g. `member`, `media`.
  pub target_type: String,
  pub target_id:   String,
  pub target_name: Option<String>,
  pub changes:     serde_json::Value,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOperationLog {
  pub action:      LogAction,
  pub target_type: String,
  pub target_id:   String,
  pub target_name: Option<String>,
  pub changes:     serde_json::Value,
}
