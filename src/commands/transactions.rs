// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::commands::{load_for_update, persist};
use crate::kv::KvStore;
use crate::ledger::{self, NewTransaction};
use crate::models::{AppState, Currency, TxnType};
use crate::state::load_app_state;
use crate::utils::{iso19, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(kv, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let mut st = load_for_update(kv)?;
            let t = ledger::delete_transaction(&mut st, id)?;
            persist(kv, &st)?;
            println!("Deleted {} {} {}", t.kind.as_str(), t.amount, t.currency.as_str());
        }
        Some(("list", sub)) => list(kv, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn parse_new(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let kind_s = sub.get_one::<String>("type").unwrap();
    let kind = TxnType::from_str(kind_s)
        .ok_or_else(|| anyhow!("Unknown type '{}' (use income|expense)", kind_s))?;
    let ccy_s = sub.get_one::<String>("currency").unwrap();
    let currency = Currency::from_str(ccy_s)
        .ok_or_else(|| anyhow!("Unknown currency '{}' (use USD|AED|TL)", ccy_s))?;
    let at = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?.and_hms_opt(12, 0, 0).map(|n| n.and_utc()),
        None => None,
    };
    let gold_grams = match sub.get_one::<String>("grams") {
        Some(g) => Some(parse_decimal(g)?),
        None => None,
    };
    Ok(NewTransaction {
        kind,
        currency,
        amount: sub.get_one::<u64>("amount").copied().unwrap_or(0),
        category: sub.get_one::<String>("category").cloned().unwrap_or_default(),
        note: sub.get_one::<String>("note").cloned().unwrap_or_default(),
        at,
        gold_grams,
    })
}

fn add(kv: &KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let input = parse_new(sub)?;
    let mut st = load_for_update(kv)?;
    let t = ledger::add_transaction(&mut st, input)?;
    let line = match t.grams {
        Some(g) => format!("Recorded {} g gold income ({})", g, t.id),
        None => format!(
            "Recorded {} {} {} ({})",
            t.kind.as_str(),
            t.amount,
            t.currency.as_str(),
            t.id
        ),
    };
    persist(kv, &st)?;
    println!("{}", line);
    Ok(())
}

fn list(kv: &KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let st = load_app_state(kv);
    let data = query_rows(&st, sub);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.at.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "At", "Type", "Amount", "CCY", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub at: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub note: String,
}

/// Newest first, honouring `--limit`.
pub fn query_rows(st: &AppState, sub: &clap::ArgMatches) -> Vec<TransactionRow> {
    let mut txns: Vec<_> = st.txns.iter().collect();
    txns.sort_by(|a, b| b.at.cmp(&a.at));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txns.truncate(*limit);
    }
    txns.into_iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            at: iso19(&t.at),
            kind: t.kind.as_str().to_string(),
            amount: match t.grams {
                Some(g) => format!("{} g", g),
                None => t.amount.to_string(),
            },
            currency: if t.is_gold() {
                "GOLD".to_string()
            } else {
                t.currency.as_str().to_string()
            },
            category: t.category.clone(),
            note: t.note.clone(),
        })
        .collect()
}
