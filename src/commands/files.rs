// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::commands::{load_for_update, persist};
use crate::config::Config;
use crate::files::FileSnapshotStore;
use crate::kv::KvStore;
use crate::platform::CliPlatform;
use crate::utils::{iso19, maybe_print_json, pretty_table};

/// The terminal answers platform prompts from command-line arguments.
fn platform_for(sub: &clap::ArgMatches) -> CliPlatform {
    let arg = |name: &str| sub.try_get_one::<String>(name).ok().flatten();
    let mut p = CliPlatform::new();
    if let Some(dir) = arg("dir") {
        p = p.with_directory(dir);
    }
    if let Some(dir) = arg("outbox") {
        p = p.with_outbox(dir);
    }
    if let Some(path) = arg("path") {
        p = p.with_document(path);
    }
    p
}

pub fn handle(kv: &KvStore, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let platform = platform_for(sub);
    let store = FileSnapshotStore::new(kv, cfg, &platform);
    match name {
        "save" => {
            let st = load_for_update(kv)?;
            let label = sub.get_one::<String>("name").unwrap();
            let id = if sub.get_flag("user-dir") {
                store.save_snapshot_to_user_dir(label, &st, sub.get_flag("repick"))
            } else {
                store.save_snapshot_to_file(label, &st)
            };
            let id = id.ok_or_else(|| anyhow!("Snapshot file was not written"))?;
            println!("Saved {}", id);
        }
        "list" => {
            let items = store.list_file_snapshots();
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                return Ok(());
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|i| vec![i.id.clone(), iso19(&i.at), i.name.clone()])
                .collect();
            println!("{}", pretty_table(&["Id", "At", "Name"], rows));
        }
        "restore" => {
            let id = sub.get_one::<String>("id").unwrap();
            let snap = store
                .load_file_snapshot_by_id(id)
                .ok_or_else(|| anyhow!("Could not read snapshot file {}", id))?;
            persist(kv, &snap.app_state())?;
            println!("Restored '{}' from {}", snap.name, iso19(&snap.at));
        }
        "rm" => {
            let id = sub.get_one::<String>("id").unwrap();
            store.try_delete(id)?;
            println!("Deleted {}", id);
        }
        "pick" => match store.pick_snapshot_from_device() {
            Some(snap) => {
                persist(kv, &snap.app_state())?;
                println!("Restored '{}' from picked file", snap.name);
            }
            None => println!("Nothing picked"),
        },
        _ => {}
    }
    Ok(())
}
