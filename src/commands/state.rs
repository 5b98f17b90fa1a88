// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::backup;
use crate::commands::persist;
use crate::kv::KvStore;
use crate::models::AppState;
use crate::state::{clear_state, load_app_state};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(kv, sub)?,
        Some(("clear", _)) => {
            if !clear_state(kv) {
                bail!("Could not clear state");
            }
            println!("State cleared");
        }
        Some(("import", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let st = import_file(path)?;
            persist(kv, &st)?;
            println!(
                "Imported state: {} transactions, {} buys, {} notes, {} todos",
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

/// Read a state from a file holding a raw state, a `{state: ...}` wrapper,
/// a compact backup object, or a backup code string.
pub fn import_file(path: &str) -> Result<AppState> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Reading {}", path))?;
    let doc = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(code)) => backup::decode(&code),
        Ok(v) => backup::unpack(&v),
        Err(_) => backup::decode(raw.trim()),
    };
    match doc {
        Some(doc) => Ok(AppState::heal(&doc)),
        None => bail!("{} does not contain a state or a backup code", path),
    }
}

fn show(kv: &KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let st = load_app_state(kv);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st)? {
        return Ok(());
    }
    let goal = if st.goal_usd > Decimal::ZERO {
        format!("{} USD by {}", st.goal_usd, st.target_date)
    } else {
        "-".to_string()
    };
    let rows = vec![
        vec!["Backend".into(), kv.active().to_string()],
        vec!["USD".into(), st.usd.to_string()],
        vec!["AED".into(), st.aed.to_string()],
        vec!["TL".into(), st.tl.to_string()],
        vec!["Gold (g)".into(), st.gold_grams.to_string()],
        vec!["Goal".into(), goal],
        vec!["Transactions".into(), st.txns.len().to_string()],
        vec!["Buys".into(), st.buys.len().to_string()],
        vec!["Notes".into(), st.notes.len().to_string()],
        vec!["Todos".into(), st.todos.len().to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
