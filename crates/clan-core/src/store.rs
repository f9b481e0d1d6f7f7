//! The `ClanStore` trait.
//!
//! Implemented by storage backends (e.g. `clan-store-sqlite`). Callers that
//! only read or edit individual records depend on this abstraction; bulk
//! loading is backend-specific and lives on the concrete store.

use std::future::Future;

use uuid::Uuid;

use crate::{
  id::MemberId,
  media::{MediaKind, MediaResource, NewMediaResource, NewOperationLog, OperationLog},
  member::{Member, NewMember},
};

/// Abstraction over a genealogy store backend.
///
/// Every member mutation keeps the full-text projection over (name, bio) in
/// step with the primary record: an insert adds it, a delete removes it, an
/// update replaces it wholesale.
pub trait ClanStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Members ───────────────────────────────────────────────────────────

  /// Create a member with a fresh identity.
  ///
  /// Fails if the name is blank or `father_id` names no existing member.
  fn add_member(
    &self,
    input: NewMember,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// Retrieve a member by id. Returns `None` if not found.
  fn get_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// All members, ordered by generation.
  fn list_members(&self) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Replace every mutable field of an existing member. The id and
  /// `created_at` are kept; `updated_at` is set by the store.
  fn update_member(
    &self,
    member: Member,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// Returns `false` if the member does not exist.
  fn set_portrait(
    &self,
    id: MemberId,
    portrait_path: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a member and, by cascade, its media. Refused while any member
  /// names it as father. Returns `false` if it did not exist.
  fn delete_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn has_children(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_members(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Full-text search over name and biography, best match first.
  fn search_members(
    &self,
    text: String,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  // ── Media ─────────────────────────────────────────────────────────────

  fn add_media(
    &self,
    input: NewMediaResource,
  ) -> impl Future<Output = Result<MediaResource, Self::Error>> + Send + '_;

  fn delete_media(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Media of one member, newest first, optionally restricted to one kind.
  fn list_media(
    &self,
    member_id: MemberId,
    kind: Option<MediaKind>,
  ) -> impl Future<Output = Result<Vec<MediaResource>, Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  fn get_setting(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Insert or overwrite a setting.
  fn put_setting(
    &self,
    key: String,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The configured generation-name cycle, or the default one.
  fn generation_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Operation log ─────────────────────────────────────────────────────

  fn append_log(
    &self,
    entry: NewOperationLog,
  ) -> impl Future<Output = Result<OperationLog, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_logs(
    &self,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<OperationLog>, Self::Error>> + Send + '_;
}
