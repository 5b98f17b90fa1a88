// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};

use crate::backup;
use crate::commands::{load_for_update, persist};
use crate::kv::KvStore;

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let code = backup::encode(&load_for_update(kv)?);
            match sub.get_one::<String>("out") {
                Some(out) => {
                    std::fs::write(out, &code).with_context(|| format!("Writing {}", out))?;
                    println!("Backup code written to {} ({} chars)", out, code.len());
                }
                None => println!("{}", code),
            }
        }
        Some(("import", sub)) => {
            let code = match (sub.get_one::<String>("code"), sub.get_one::<String>("path")) {
                (Some(code), _) => code.clone(),
                (None, Some(path)) => {
                    std::fs::read_to_string(path).with_context(|| format!("Reading {}", path))?
                }
                (None, None) => bail!("Pass --code or --path"),
            };
            let Some(st) = backup::decode_state(code.trim()) else {
                bail!("Not a backup code");
            };
            persist(kv, &st)?;
            println!(
                "Imported {} transactions, {} buys, {} notes, {} todos",
                st.txns.len(),
                st.buys.len(),
                st.notes.len(),
                st.todos.len()
            );
        }
        _ => {}
    }
    Ok(())
}
