// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use serde_json::json;

use crate::kv::KvStore;
use crate::models::Transaction;
use crate::state::load_app_state;
use crate::utils::iso19;

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(kv, sub),
        _ => Ok(()),
    }
}

fn row(t: &Transaction) -> [String; 7] {
    [
        iso19(&t.at),
        t.kind.as_str().to_string(),
        t.amount.to_string(),
        t.currency.as_str().to_string(),
        t.grams.map(|g| g.to_string()).unwrap_or_default(),
        t.category.clone(),
        t.note.clone(),
    ]
}

fn export_transactions(kv: &KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let st = load_app_state(kv);
    let mut txns: Vec<&Transaction> = st.txns.iter().collect();
    txns.sort_by(|a, b| a.at.cmp(&b.at));

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "at", "type", "amount", "currency", "grams", "category", "note",
            ])?;
            for t in txns {
                wtr.write_record(row(t))?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txns
                .into_iter()
                .map(|t| {
                    let [at, kind, amount, currency, grams, category, note] = row(t);
                    json!({
                        "at": at, "type": kind, "amount": amount, "currency": currency,
                        "grams": grams, "category": category, "note": note
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
