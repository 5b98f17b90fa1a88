// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketvault::config::Config;
use pocketvault::error::{Result, StoreError};
use pocketvault::files::{FILE_LIST_CAP, FileLocation, FileSnapshotStore, parse_file_id};
use pocketvault::keys;
use pocketvault::kv::KvStore;
use pocketvault::models::AppState;
use pocketvault::platform::{CliPlatform, Platform};
use rust_decimal::Decimal;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

struct NoShare;

impl Platform for NoShare {
    fn request_directory(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
    fn share_file(&self, _path: &Path) -> Result<()> {
        Err(StoreError::unavailable("no share sheet"))
    }
    fn pick_document(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

fn rich_state() -> AppState {
    AppState {
        usd: Decimal::from(1200),
        goal_usd: Decimal::from(5000),
        ..AppState::default()
    }
}

#[test]
fn save_to_file_writes_into_the_share_cache() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let outbox = dir.path().join("outbox");
    let platform = CliPlatform::new().with_outbox(&outbox);
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let id = store.save_snapshot_to_file("Dubai trip", &rich_state()).unwrap();
    assert!(id.starts_with("share:"));
    let (_, path) = parse_file_id(&id).unwrap();
    assert!(path.starts_with(cfg.cache_dir.join("snapshots")));
    assert!(path.file_name().unwrap().to_string_lossy().ends_with("-Dubai_trip.json"));
    assert_eq!(outbox.read_dir().unwrap().count(), 1);

    let snap = store.load_file_snapshot_by_id(&id).unwrap();
    assert_eq!(snap.name, "Dubai trip");
    assert_eq!(snap.app_state().usd, Decimal::from(1200));
}

#[test]
fn share_failure_still_returns_the_written_file() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let store = FileSnapshotStore::new(&kv, &cfg, &NoShare);
    let id = store.save_snapshot_to_file("x", &AppState::default()).unwrap();
    assert!(parse_file_id(&id).unwrap().1.exists());
}

#[test]
fn unwritable_cache_falls_back_to_documents() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    std::fs::create_dir_all(&cfg.cache_dir).unwrap();
    std::fs::write(cfg.cache_dir.join("snapshots"), "not a directory").unwrap();
    let kv = KvStore::in_memory();
    let platform = CliPlatform::new();
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let id = store.save_snapshot_to_file("x", &AppState::default()).unwrap();
    assert!(id.starts_with("file:"));
    let (_, path) = parse_file_id(&id).unwrap();
    assert!(path.starts_with(cfg.document_dir.as_ref().unwrap()));
}

#[test]
fn user_dir_grant_is_remembered_and_indexed() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let granted = dir.path().join("granted");
    let platform = CliPlatform::new().with_directory(&granted);
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let id = store
        .save_snapshot_to_user_dir("mine", &AppState::default(), false)
        .unwrap();
    assert!(id.starts_with("saf:"));
    assert_eq!(kv.get(keys::USER_DIR), Some(granted.to_string_lossy().to_string()));

    // A second save reuses the cached grant even without a platform answer.
    let store2 = FileSnapshotStore::new(&kv, &cfg, &NoShare);
    assert!(store2
        .save_snapshot_to_user_dir("again", &AppState::default(), false)
        .is_some());
    assert!(store2
        .save_snapshot_to_user_dir("repick", &AppState::default(), true)
        .is_none());

    let listed = store.list_file_snapshots();
    let saf: Vec<_> = listed
        .iter()
        .filter(|i| i.location == FileLocation::UserDir)
        .collect();
    assert_eq!(saf.len(), 2);
    assert_eq!(saf[0].name, "again");
}

#[test]
fn dismissed_directory_grant_writes_nothing() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let store = FileSnapshotStore::new(&kv, &cfg, &NoShare);
    assert!(store.choose_directory(false).is_none());
    assert!(store
        .save_snapshot_to_user_dir("x", &AppState::default(), false)
        .is_none());
    assert!(kv.get(keys::FILE_SNAPSHOT_INDEX).is_none());
}

#[test]
fn listing_merges_directories_and_caps() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let platform = CliPlatform::new();
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let sandbox = cfg.sandbox_dir();
    std::fs::create_dir_all(&sandbox).unwrap();
    for i in 0..FILE_LIST_CAP + 5 {
        let name = format!("pocketvault-{}-n{}.json", 1_700_000_000_000_i64 + i as i64, i);
        std::fs::write(sandbox.join(name), "{}").unwrap();
    }
    std::fs::write(sandbox.join("notes.txt"), "ignored").unwrap();
    store.save_snapshot_to_file("newest", &AppState::default()).unwrap();

    let listed = store.list_file_snapshots();
    assert_eq!(listed.len(), FILE_LIST_CAP);
    assert_eq!(listed[0].name, "newest");
    assert!(listed.windows(2).all(|w| w[0].at >= w[1].at));
    assert!(!listed.iter().any(|i| i.id.ends_with("notes.txt")));
}

#[test]
fn delete_handles_each_prefix_and_missing_files() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let platform = CliPlatform::new().with_directory(dir.path().join("granted"));
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let shared = store.save_snapshot_to_file("a", &AppState::default()).unwrap();
    let saf = store
        .save_snapshot_to_user_dir("b", &AppState::default(), false)
        .unwrap();

    store.delete_file_snapshot_by_id(&shared);
    assert!(!parse_file_id(&shared).unwrap().1.exists());
    store.delete_file_snapshot_by_id(&saf);
    assert!(!parse_file_id(&saf).unwrap().1.exists());
    assert!(store.list_file_snapshots().is_empty());

    // Already gone, unknown prefix: both quietly ignored.
    store.delete_file_snapshot_by_id(&saf);
    store.delete_file_snapshot_by_id("kv:whatever");
}

#[test]
fn delete_only_touches_files_it_manages() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let granted = dir.path().join("granted");
    let platform = CliPlatform::new().with_directory(&granted);
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let unrelated = dir.path().join("unrelated.txt");
    std::fs::write(&unrelated, "keep me").unwrap();
    let err = store
        .try_delete(&FileLocation::File.id_for(&unrelated))
        .unwrap_err();
    assert!(!err.is_not_found());
    store.delete_file_snapshot_by_id(&FileLocation::Share.id_for(&unrelated));
    assert!(unrelated.exists());

    // A json file in the granted directory that was never indexed.
    store
        .save_snapshot_to_user_dir("indexed", &AppState::default(), false)
        .unwrap();
    let stray = granted.join("stray.json");
    std::fs::write(&stray, "{}").unwrap();
    assert!(store
        .try_delete(&FileLocation::UserDir.id_for(&stray))
        .unwrap_err()
        .is_not_found());
    assert!(stray.exists());

    // Nested paths below a snapshot directory are refused as well.
    let docs = cfg.document_dir.clone().unwrap();
    let nested = docs.join("inner").join("x.json");
    std::fs::create_dir_all(nested.parent().unwrap()).unwrap();
    std::fs::write(&nested, "{}").unwrap();
    assert!(store.try_delete(&FileLocation::File.id_for(&nested)).is_err());
    assert!(nested.exists());
}

#[test]
fn granted_documents_dir_lists_each_file_once() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let docs = cfg.document_dir.clone().unwrap();
    let platform = CliPlatform::new().with_directory(&docs);
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);

    let id = store
        .save_snapshot_to_user_dir("both", &AppState::default(), false)
        .unwrap();
    let listed = store.list_file_snapshots();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].location, FileLocation::UserDir);
}

#[test]
fn picking_accepts_snapshots_and_backup_codes() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();

    let code = dir.path().join("code.json");
    std::fs::write(&code, json!({"v": 1, "u": 75}).to_string()).unwrap();
    let platform = CliPlatform::new().with_document(&code);
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);
    let snap = store.pick_snapshot_from_device().unwrap();
    assert_eq!(snap.name, "code");
    assert_eq!(snap.app_state().usd, Decimal::from(75));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "[1,2,3]").unwrap();
    let platform = CliPlatform::new().with_document(&garbage);
    let store = FileSnapshotStore::new(&kv, &cfg, &platform);
    assert!(store.pick_snapshot_from_device().is_none());
}

#[test]
fn dismissed_picker_is_none() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::in_memory();
    let store = FileSnapshotStore::new(&kv, &cfg, &NoShare);
    assert!(store.pick_snapshot_from_device().is_none());
}
