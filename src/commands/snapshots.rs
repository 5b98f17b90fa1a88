// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::commands::{load_for_update, persist};
use crate::config::Config;
use crate::kv::KvStore;
use crate::snapshots::SnapshotStore;
use crate::utils::{iso19, maybe_print_json, pretty_table};

pub fn handle(kv: &KvStore, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let store = SnapshotStore::new(kv, cfg.eviction);
    match m.subcommand() {
        Some(("create", sub)) => {
            let st = load_for_update(kv)?;
            let snap = store
                .create_snapshot(sub.get_one::<String>("name").unwrap(), &st)
                .ok_or_else(|| anyhow!("Could not create snapshot"))?;
            println!("Saved snapshot '{}' ({})", snap.name, snap.id);
        }
        Some(("list", sub)) => {
            let entries: Vec<_> = store.list_snapshots().iter().map(|s| s.entry()).collect();
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| vec![e.id.clone(), iso19(&e.at), e.name.clone(), e.version.clone()])
                .collect();
            println!("{}", pretty_table(&["Id", "At", "Name", "Version"], rows));
        }
        Some(("restore", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let snap = store
                .load_snapshot_by_id(id)
                .ok_or_else(|| anyhow!("No snapshot {}", id))?;
            persist(kv, &snap.app_state())?;
            println!("Restored '{}' from {}", snap.name, iso19(&snap.at));
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store.delete_snapshot_by_id(id);
            println!("Deleted snapshot {}", id);
        }
        _ => {}
    }
    Ok(())
}
