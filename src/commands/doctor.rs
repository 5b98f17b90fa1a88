// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::config::Config;
use crate::files::{FileLocation, FileSnapshotStore, parse_file_id};
use crate::kv::{BackendKind, KvStore};
use crate::platform::CliPlatform;
use crate::snapshots::SnapshotStore;
use crate::utils::pretty_table;

pub fn collect_issues(kv: &KvStore, cfg: &Config) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    // 1) Backends the probe could not set up
    for e in &kv.report().entries {
        let native_browser = e.kind == BackendKind::BrowserStore && !cfg!(target_arch = "wasm32");
        if !e.available && !native_browser && !cfg.is_disabled(e.kind) {
            rows.push(vec!["backend_unavailable".into(), format!("{}: {}", e.kind, e.detail)]);
        }
    }

    // 2) Snapshot index and bodies out of step
    let snaps = SnapshotStore::new(kv, cfg.eviction);
    for e in snaps.dangling_entries() {
        rows.push(vec!["snapshot_missing_body".into(), format!("{} ({})", e.id, e.name)]);
    }
    for id in snaps.orphaned_bodies() {
        rows.push(vec!["snapshot_orphaned_body".into(), id]);
    }

    // 3) Recorded user-directory files that are gone
    let platform = CliPlatform::new();
    let files = FileSnapshotStore::new(kv, cfg, &platform);
    for info in files.list_file_snapshots() {
        if info.location != FileLocation::UserDir {
            continue;
        }
        if let Some((_, path)) = parse_file_id(&info.id) {
            if !path.exists() {
                rows.push(vec!["file_snapshot_missing".into(), info.id.clone()]);
            }
        }
    }
    rows
}

pub fn handle(kv: &KvStore, cfg: &Config) -> Result<()> {
    let rows = collect_issues(kv, cfg);
    if rows.is_empty() {
        println!("✅ doctor: no issues found ({})", kv.report().summary());
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
