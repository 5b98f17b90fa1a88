// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::commands::{load_for_update, persist};
use crate::kv::KvStore;
use crate::ledger;
use crate::state::load_app_state;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let mut st = load_for_update(kv)?;
            let id = ledger::add_todo(
                &mut st,
                sub.get_one::<String>("text").unwrap(),
                sub.get_one::<String>("tag").unwrap(),
            )?
            .id
            .clone();
            persist(kv, &st)?;
            println!("Added todo {}", id);
        }
        Some(("toggle", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let mut st = load_for_update(kv)?;
            let done = ledger::toggle_todo(&mut st, id)?;
            persist(kv, &st)?;
            println!("Todo {} is now {}", id, if done { "done" } else { "open" });
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let mut st = load_for_update(kv)?;
            let t = ledger::delete_todo(&mut st, id)?;
            persist(kv, &st)?;
            println!("Deleted todo '{}'", t.text);
        }
        Some(("list", sub)) => {
            let st = load_app_state(kv);
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st.todos)? {
                return Ok(());
            }
            let rows: Vec<Vec<String>> = st
                .todos
                .iter()
                .map(|t| {
                    vec![
                        t.id.clone(),
                        if t.done { "x" } else { " " }.to_string(),
                        t.text.clone(),
                        t.tag.clone(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Id", "Done", "Text", "Tag"], rows));
        }
        _ => {}
    }
    Ok(())
}
