// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::commands::{load_for_update, persist};
use crate::kv::KvStore;
use crate::ledger::{self, NoteEdit};
use crate::state::load_app_state;
use crate::utils::{iso19, maybe_print_json, pretty_table, truncate_chars};

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let items: Vec<String> = sub
                .get_many::<String>("item")
                .map(|v| v.cloned().collect())
                .unwrap_or_default();
            let mut st = load_for_update(kv)?;
            let note = ledger::add_note(
                &mut st,
                sub.get_one::<String>("title").unwrap(),
                sub.get_one::<String>("tag").unwrap(),
                sub.get_one::<String>("body").unwrap(),
                &items,
            )?;
            let id = note.id.clone();
            persist(kv, &st)?;
            println!("Added note {}", id);
        }
        Some(("edit", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let edit = NoteEdit {
                title: sub.get_one::<String>("title").cloned(),
                tag: sub.get_one::<String>("tag").cloned(),
                body: sub.get_one::<String>("body").cloned(),
                add_photo: sub.get_one::<String>("photo").cloned(),
            };
            let mut st = load_for_update(kv)?;
            ledger::edit_note(&mut st, id, edit)?;
            persist(kv, &st)?;
            println!("Updated note {}", id);
        }
        Some(("check", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let index = *sub.get_one::<usize>("item").unwrap();
            let mut st = load_for_update(kv)?;
            let done = ledger::toggle_checklist_item(&mut st, id, index)?;
            persist(kv, &st)?;
            println!("Item {} is now {}", index, if done { "done" } else { "open" });
        }
        Some(("list", sub)) => {
            let st = load_app_state(kv);
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st.notes)? {
                return Ok(());
            }
            let rows: Vec<Vec<String>> = st
                .notes
                .iter()
                .map(|n| {
                    let done = n.checklist.iter().filter(|c| c.done).count();
                    vec![
                        n.id.clone(),
                        iso19(&n.at),
                        n.title.clone(),
                        n.tag.clone(),
                        format!("{}/{}", done, n.checklist.len()),
                        truncate_chars(&n.body, 40),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "At", "Title", "Tag", "Checklist", "Body"], rows)
            );
        }
        _ => {}
    }
    Ok(())
}
