//! Integration tests for `SqliteStore` against an in-memory database.

use clan_core::{
  MemberId,
  load::{LoadOptions, Warning},
  media::{LogAction, MediaKind, NewMediaResource, NewOperationLog},
  member::NewMember,
  record::RawRecord,
  settings::GENERATION_NAMES_KEY,
  store::ClanStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn row(name: &str, father: &str, generation: u32) -> RawRecord {
  RawRecord::new(name)
    .with_father(father)
    .with_generation(generation)
}

fn family() -> Vec<RawRecord> {
  vec![
    row("Ancestor", "", 1),
    row("ChildA", "Ancestor", 2),
    row("ChildB", "Ancestor", 2),
    row("Grandchild", "ChildA", 3),
  ]
}

const CLEAR: LoadOptions = LoadOptions { clear: true };
const APPEND: LoadOptions = LoadOptions { clear: false };

async fn schema_objects(s: &SqliteStore) -> Vec<(String, String)> {
  s.conn
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT type, name FROM sqlite_master
         WHERE name NOT LIKE 'sqlite_%' AND name NOT LIKE 'members_fts_%'
         ORDER BY type, name",
      )?;
      let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await
    .unwrap()
}

async fn member_named(s: &SqliteStore, name: &str) -> clan_core::member::Member {
  s.list_members()
    .await
    .unwrap()
    .into_iter()
    .find(|m| m.name == name)
    .unwrap()
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_creates_every_object() {
  let s = store().await;
  assert!(s.schema_report().full_text);
  assert!(s.schema_report().warnings.is_empty());

  let objects = schema_objects(&s).await;
  for expected in [
    ("index", "idx_media_member"),
    ("index", "idx_members_father"),
    ("table", "media_resources"),
    ("table", "members"),
    ("table", "members_fts"),
    ("table", "operation_logs"),
    ("table", "settings"),
    ("trigger", "members_ad"),
    ("trigger", "members_ai"),
    ("trigger", "members_au"),
  ] {
    assert!(
      objects.iter().any(|(t, n)| t == expected.0 && n == expected.1),
      "missing {expected:?}"
    );
  }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let s = store().await;
  let before = schema_objects(&s).await;

  let report = s.ensure_schema().await.unwrap();
  s.ensure_schema().await.unwrap();

  assert!(report.full_text);
  assert_eq!(schema_objects(&s).await, before);
}

#[tokio::test]
async fn default_settings_are_seeded_but_never_overwritten() {
  let s = store().await;
  let names = s.generation_names().await.unwrap();
  assert_eq!(names.first().map(String::as_str), Some("始"));

  s.put_setting(GENERATION_NAMES_KEY.into(), r#"["甲","乙"]"#.into())
    .await
    .unwrap();
  s.ensure_schema().await.unwrap();

  assert_eq!(s.generation_names().await.unwrap(), vec!["甲", "乙"]);
}

#[tokio::test]
async fn file_store_creates_parent_directories() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("clan.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.load(family(), CLEAR).await.unwrap();
  drop(s);

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.count_members().await.unwrap(), 4);
}

#[tokio::test]
async fn unavailable_full_text_degrades_to_like_search() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("clan.db");

  // A stray table under an FTS5 shadow name makes the virtual table fail.
  rusqlite::Connection::open(&path)
    .unwrap()
    .execute_batch("CREATE TABLE members_fts_data (x);")
    .unwrap();

  let s = SqliteStore::open(&path).await.unwrap();
  let schema = s.schema_report().clone();
  assert!(!schema.full_text);
  assert_eq!(schema.warnings.len(), 1);
  assert!(matches!(schema.warnings[0], Warning::FullTextUnavailable(_)));

  let objects = schema_objects(&s).await;
  for expected in [
    ("index", "idx_media_member"),
    ("index", "idx_members_father"),
    ("table", "media_resources"),
    ("table", "members"),
    ("table", "operation_logs"),
    ("table", "settings"),
  ] {
    assert!(
      objects.iter().any(|(t, n)| t == expected.0 && n == expected.1),
      "missing {expected:?}"
    );
  }
  assert!(!objects.iter().any(|(_, n)| n == "members_fts"));

  let report = s
    .load(vec![RawRecord::new("Chen").with_bio("river keeper")], CLEAR)
    .await
    .unwrap();
  assert_eq!(report.inserted, 1);
  assert!(
    report
      .warnings
      .iter()
      .any(|w| matches!(w, Warning::FullTextUnavailable(_)))
  );

  let hits = s.search_members("keeper".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Chen");
}

// ─── Bulk load ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_links_three_generations() {
  let s = store().await;
  let report = s.load(family(), CLEAR).await.unwrap();

  assert_eq!(report.inserted, 4);
  assert!(report.warnings.is_empty());

  let ancestor = member_named(&s, "Ancestor").await;
  let child_a = member_named(&s, "ChildA").await;
  assert_eq!(ancestor.father_id, None);
  assert_eq!(child_a.father_id, Some(ancestor.id));
  assert_eq!(member_named(&s, "ChildB").await.father_id, Some(ancestor.id));
  assert_eq!(member_named(&s, "Grandchild").await.father_id, Some(child_a.id));
}

#[tokio::test]
async fn load_reports_unresolved_father() {
  let s = store().await;
  let report = s
    .load(vec![row("Orphan", "NoSuchFather", 2)], CLEAR)
    .await
    .unwrap();

  assert_eq!(report.inserted, 1);
  assert_eq!(report.warnings.len(), 1);
  assert!(matches!(
    &report.warnings[0],
    Warning::UnresolvedFather(w) if w.father == "NoSuchFather" && w.child == "Orphan"
  ));
  assert_eq!(member_named(&s, "Orphan").await.father_id, None);
}

#[tokio::test]
async fn load_skips_blank_names() {
  let s = store().await;
  let report = s
    .load(vec![row("  ", "", 1), row("Kept", "", 1), row("", "Kept", 2)], CLEAR)
    .await
    .unwrap();

  assert_eq!(report.inserted, 1);
  assert_eq!(s.count_members().await.unwrap(), 1);
}

#[tokio::test]
async fn clear_then_load_leaves_no_residue() {
  let s = store().await;
  s.load(family(), CLEAR).await.unwrap();
  let first = member_named(&s, "Ancestor").await;
  s.add_media(NewMediaResource {
    member_id:   first.id,
    kind:        MediaKind::Photo,
    file_path:   "photos/a.jpg".into(),
    title:       "portrait".into(),
    description: None,
    file_hash:   None,
    file_size:   10,
    is_primary:  true,
  })
  .await
  .unwrap();

  let report = s
    .load(vec![row("Solo", "", 1), row("Pair", "", 1)], CLEAR)
    .await
    .unwrap();

  assert_eq!(report.inserted, 2);
  assert!(report.cleared);
  assert_eq!(s.count_members().await.unwrap(), 2);
  assert!(s.list_media(first.id, None).await.unwrap().is_empty());
  assert!(s.search_members("Ancestor".into()).await.unwrap().is_empty());
  // Settings are re-seeded after the clear.
  assert!(s.get_setting(GENERATION_NAMES_KEY.into()).await.unwrap().is_some());

  let v = s.verify().await.unwrap();
  assert_eq!(v.members, 2);
  assert!(v.reconcile(&report).is_ok());
}

#[tokio::test]
async fn appending_load_resolves_existing_fathers() {
  let s = store().await;
  s.load(family(), CLEAR).await.unwrap();

  let report = s
    .load(vec![row("GreatGrandchild", "Grandchild", 4)], APPEND)
    .await
    .unwrap();

  assert!(report.warnings.is_empty());
  assert_eq!(s.count_members().await.unwrap(), 5);
  assert_eq!(
    member_named(&s, "GreatGrandchild").await.father_id,
    Some(member_named(&s, "Grandchild").await.id)
  );
}

#[tokio::test]
async fn failed_insert_rolls_back_whole_load() {
  let s = store().await;
  s.load(family(), CLEAR).await.unwrap();

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON members
         WHEN new.name = 'Boom'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s
    .load(vec![row("Fine", "", 1), row("Boom", "", 1)], CLEAR)
    .await
    .unwrap_err();

  assert!(matches!(err, Error::Import { index: 1, ref name, .. } if name == "Boom"));
  // Neither the clear nor the first insert survived.
  assert_eq!(s.count_members().await.unwrap(), 4);
  assert!(s.search_members("Fine".into()).await.unwrap().is_empty());
}

// ─── Full-text consistency ───────────────────────────────────────────────────

#[tokio::test]
async fn search_follows_insert_update_and_delete() {
  let s = store().await;
  let mut input = NewMember::new("Li Wei");
  input.bio = "Founded the ancestral hall at Qingshan".into();
  let member = s.add_member(input).await.unwrap();

  let hits = s.search_members("Qingshan".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, member.id);

  let mut edited = member.clone();
  edited.bio = "Moved south".into();
  s.update_member(edited).await.unwrap();
  assert!(s.search_members("Qingshan".into()).await.unwrap().is_empty());
  assert_eq!(s.search_members("south".into()).await.unwrap().len(), 1);

  assert!(s.delete_member(member.id).await.unwrap());
  assert!(s.search_members("south".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn loaded_biographies_are_searchable() {
  let s = store().await;
  s.load(
    vec![
      RawRecord::new("Elder").with_bio("Scholar of the *imperial* exams"),
      RawRecord::new("Younger").with_father("Elder").with_bio("Merchant"),
    ],
    CLEAR,
  )
  .await
  .unwrap();

  let hits = s.search_members("imperial".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Elder");
  assert_eq!(s.search_members("Younger".into()).await.unwrap().len(), 1);
  assert!(s.search_members("   ".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_quotes_operators() {
  let s = store().await;
  s.load(vec![RawRecord::new("Zhou").with_bio("said \"NOT\" once")], CLEAR)
    .await
    .unwrap();

  // Would be an FTS5 syntax error if passed through unquoted.
  let hits = s.search_members("\"NOT".into()).await.unwrap();
  assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn search_falls_back_to_like_without_index() {
  let s = store().await;
  s.load(vec![RawRecord::new("Chen").with_bio("keeper of 50% of the land")], CLEAR)
    .await
    .unwrap();

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "DROP TRIGGER members_ai; DROP TRIGGER members_ad; DROP TRIGGER members_au;
         DROP TABLE members_fts;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert_eq!(s.search_members("50%".into()).await.unwrap().len(), 1);
  assert!(s.search_members("60%".into()).await.unwrap().is_empty());
  assert!(!s.rebuild_search_index().await.unwrap());
}

#[tokio::test]
async fn rebuild_restores_projection() {
  let s = store().await;
  s.load(vec![RawRecord::new("Wu").with_bio("river boatman")], CLEAR)
    .await
    .unwrap();

  s.conn
    .call(|conn| {
      conn.execute("INSERT INTO members_fts(members_fts) VALUES ('delete-all')", [])?;
      Ok(())
    })
    .await
    .unwrap();
  assert!(s.search_members("boatman".into()).await.unwrap().is_empty());

  assert!(s.rebuild_search_index().await.unwrap());
  assert_eq!(s.search_members("boatman".into()).await.unwrap().len(), 1);
}

// ─── Member accessors ────────────────────────────────────────────────────────

#[tokio::test]
async fn add_member_validates_father() {
  let s = store().await;
  let err = s
    .add_member(NewMember {
      father_id: Some(MemberId::generate()),
      ..NewMember::new("Stray")
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(clan_core::Error::UnknownFather(_))));

  let err = s.add_member(NewMember::new(" ")).await.unwrap_err();
  assert!(matches!(err, Error::Core(clan_core::Error::EmptyName)));
  assert_eq!(s.count_members().await.unwrap(), 0);
}

#[tokio::test]
async fn get_member_roundtrips_fields() {
  let s = store().await;
  let father = s.add_member(NewMember::new("Father")).await.unwrap();
  let mut input = NewMember::new("Daughter");
  input.gender = clan_core::member::Gender::Female;
  input.generation = 2;
  input.generation_name = "定".into();
  input.father_id = Some(father.id);
  input.spouse_name = "Huang Mei".into();
  input.birth_place = "Changsha".into();
  let added = s.add_member(input).await.unwrap();

  let fetched = s.get_member(added.id).await.unwrap().unwrap();
  assert_eq!(fetched, added);
  assert!(s.get_member(MemberId::generate()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_keeps_identity_and_rejects_cycles() {
  let s = store().await;
  s.load(family(), CLEAR).await.unwrap();
  let ancestor = member_named(&s, "Ancestor").await;
  let grandchild = member_named(&s, "Grandchild").await;

  let mut looped = ancestor.clone();
  looped.father_id = Some(grandchild.id);
  let err = s.update_member(looped).await.unwrap_err();
  assert!(matches!(err, Error::Core(clan_core::Error::AncestryCycle { .. })));

  let mut renamed = ancestor.clone();
  renamed.name = "Progenitor".into();
  let updated = s.update_member(renamed).await.unwrap();
  assert_eq!(updated.id, ancestor.id);
  assert_eq!(updated.created_at, ancestor.created_at);
  assert_eq!(s.get_member(ancestor.id).await.unwrap().unwrap().name, "Progenitor");

  let mut ghost = ancestor.clone();
  ghost.id = MemberId::generate();
  assert!(matches!(
    s.update_member(ghost).await.unwrap_err(),
    Error::Core(clan_core::Error::MemberNotFound(_))
  ));
}

#[tokio::test]
async fn delete_is_refused_while_children_exist() {
  let s = store().await;
  s.load(family(), CLEAR).await.unwrap();
  let child_a = member_named(&s, "ChildA").await;
  let grandchild = member_named(&s, "Grandchild").await;

  assert!(s.has_children(child_a.id).await.unwrap());
  assert!(matches!(
    s.delete_member(child_a.id).await.unwrap_err(),
    Error::Core(clan_core::Error::HasChildren(_))
  ));

  assert!(!s.has_children(grandchild.id).await.unwrap());
  assert!(s.delete_member(grandchild.id).await.unwrap());
  assert!(!s.delete_member(grandchild.id).await.unwrap());
  assert!(s.delete_member(child_a.id).await.unwrap());
}

#[tokio::test]
async fn list_orders_by_generation() {
  let s = store().await;
  s.load(
    vec![row("Late", "", 3), row("Early", "", 1), row("Middle", "", 2)],
    CLEAR,
  )
  .await
  .unwrap();

  let names: Vec<_> = s
    .list_members()
    .await
    .unwrap()
    .into_iter()
    .map(|m| m.name)
    .collect();
  assert_eq!(names, ["Early", "Middle", "Late"]);
}

#[tokio::test]
async fn set_portrait_updates_path() {
  let s = store().await;
  let m = s.add_member(NewMember::new("Sun")).await.unwrap();

  assert!(s.set_portrait(m.id, "portraits/sun.png".into()).await.unwrap());
  assert!(!s.set_portrait(MemberId::generate(), "x.png".into()).await.unwrap());
  assert_eq!(
    s.get_member(m.id).await.unwrap().unwrap().portrait_path,
    "portraits/sun.png"
  );
}

// ─── Media ───────────────────────────────────────────────────────────────────

fn media(member_id: MemberId, kind: MediaKind, path: &str) -> NewMediaResource {
  NewMediaResource {
    member_id,
    kind,
    file_path: path.into(),
    title: path.into(),
    description: Some("family archive".into()),
    file_hash: Some("abc123".into()),
    file_size: 2048,
    is_primary: false,
  }
}

#[tokio::test]
async fn media_is_filtered_and_cascades() {
  let s = store().await;
  let m = s.add_member(NewMember::new("Ma")).await.unwrap();

  let video = s
    .add_media(media(m.id, MediaKind::Video, "v/interview.mp4"))
    .await
    .unwrap();
  s.add_media(media(m.id, MediaKind::Photo, "p/1.jpg")).await.unwrap();

  assert_eq!(s.list_media(m.id, None).await.unwrap().len(), 2);
  let videos = s.list_media(m.id, Some(MediaKind::Video)).await.unwrap();
  assert_eq!(videos, vec![video.clone()]);

  assert!(s.delete_media(video.id).await.unwrap());
  assert!(!s.delete_media(video.id).await.unwrap());

  assert!(s.delete_member(m.id).await.unwrap());
  assert!(s.list_media(m.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn media_requires_existing_member() {
  let s = store().await;
  let err = s
    .add_media(media(MemberId::generate(), MediaKind::Audio, "a.mp3"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(clan_core::Error::MemberNotFound(_))));
}

// ─── Settings and logs ───────────────────────────────────────────────────────

#[tokio::test]
async fn settings_upsert() {
  let s = store().await;
  assert!(s.get_setting("theme".into()).await.unwrap().is_none());

  s.put_setting("theme".into(), "dark".into()).await.unwrap();
  s.put_setting("theme".into(), "light".into()).await.unwrap();
  assert_eq!(s.get_setting("theme".into()).await.unwrap().as_deref(), Some("light"));
}

#[tokio::test]
async fn logs_are_listed_newest_first() {
  let s = store().await;
  for (action, name) in [
    (LogAction::Create, "first"),
    (LogAction::Update, "second"),
    (LogAction::Delete, "third"),
  ] {
    s.append_log(NewOperationLog {
      action,
      target_type: "member".into(),
      target_id: MemberId::generate().to_string(),
      target_name: Some(name.into()),
      changes: serde_json::json!({ "name": name }),
    })
    .await
    .unwrap();
  }

  let logs = s.list_logs(2, 0).await.unwrap();
  assert_eq!(logs.len(), 2);
  assert_eq!(logs[0].target_name.as_deref(), Some("third"));
  assert_eq!(logs[0].action, LogAction::Delete);
  assert!(logs[0].id > logs[1].id);

  let rest = s.list_logs(10, 2).await.unwrap();
  assert_eq!(rest.len(), 1);
  assert_eq!(rest[0].changes["name"], "first");
}
