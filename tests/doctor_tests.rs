// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketvault::commands::doctor::collect_issues;
use pocketvault::config::Config;
use pocketvault::keys;
use pocketvault::kv::{BackendKind, KvStore};
use pocketvault::models::AppState;
use pocketvault::snapshots::SnapshotStore;
use tempfile::tempdir;

#[test]
fn healthy_store_reports_nothing() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::open(&cfg);
    SnapshotStore::new(&kv, cfg.eviction).create_snapshot("a", &AppState::default());
    assert!(collect_issues(&kv, &cfg).is_empty());
}

#[test]
fn index_body_mismatches_are_reported() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::open(&cfg);
    let store = SnapshotStore::new(&kv, cfg.eviction);
    let a = store.create_snapshot("a", &AppState::default()).unwrap();
    kv.remove(&keys::snapshot(&a.id));
    kv.set(&keys::snapshot("stray"), "{}");

    let issues = collect_issues(&kv, &cfg);
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert!(kinds.contains(&"snapshot_missing_body"));
    assert!(kinds.contains(&"snapshot_orphaned_body"));
    assert!(issues.iter().any(|r| r[1] == "stray"));
}

#[test]
fn disabled_backends_are_not_issues() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path()).without(BackendKind::AsyncStore);
    let kv = KvStore::open(&cfg);
    assert!(collect_issues(&kv, &cfg).is_empty());
}

#[test]
fn missing_user_dir_files_are_reported() {
    let dir = tempdir().unwrap();
    let cfg = Config::rooted(dir.path());
    let kv = KvStore::open(&cfg);
    let gone = dir.path().join("granted").join("pocketvault-1-x.json");
    kv.set(
        keys::FILE_SNAPSHOT_INDEX,
        &serde_json::json!([{
            "id": format!("saf:{}", gone.display()),
            "name": "x",
            "at": "2025-01-01T00:00:00Z",
            "version": "0.1.0"
        }])
        .to_string(),
    );
    let issues = collect_issues(&kv, &cfg);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "file_snapshot_missing");
}
