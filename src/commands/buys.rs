// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::commands::{load_for_update, persist};
use crate::kv::KvStore;
use crate::ledger;
use crate::models::AssetKind;
use crate::state::load_app_state;
use crate::utils::{iso19, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let asset_s = sub.get_one::<String>("asset").unwrap();
            let asset = AssetKind::from_str(asset_s)
                .ok_or_else(|| anyhow!("Unknown asset '{}' (use USD|GOLD)", asset_s))?;
            let spent = parse_decimal(sub.get_one::<String>("spent").unwrap())?;
            let qty = parse_decimal(sub.get_one::<String>("qty").unwrap())?;
            let at = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?.and_hms_opt(12, 0, 0).map(|n| n.and_utc()),
                None => None,
            };
            let mut st = load_for_update(kv)?;
            let b = ledger::add_buy(&mut st, asset, spent, qty, at)?;
            let line = format!(
                "Bought {} {} for {} TL ({})",
                b.qty,
                b.asset.as_str(),
                b.tl_spent,
                b.id
            );
            persist(kv, &st)?;
            println!("{}", line);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let mut st = load_for_update(kv)?;
            let b = ledger::delete_buy(&mut st, id)?;
            persist(kv, &st)?;
            println!("Deleted buy of {} {}", b.qty, b.asset.as_str());
        }
        Some(("list", sub)) => {
            let st = load_app_state(kv);
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st.buys)? {
                return Ok(());
            }
            let rows: Vec<Vec<String>> = st
                .buys
                .iter()
                .map(|b| {
                    vec![
                        b.id.clone(),
                        iso19(&b.at),
                        b.asset.as_str().to_string(),
                        b.tl_spent.to_string(),
                        b.qty.to_string(),
                        b.rate_usd_tl_at.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "At", "Asset", "TL spent", "Qty", "USD/TL"], rows)
            );
        }
        _ => {}
    }
    Ok(())
}
