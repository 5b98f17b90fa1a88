// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::commands::{load_for_update, persist};
use crate::kv::KvStore;
use crate::models::MarketCache;
use crate::state::load_app_state;
use crate::utils::{http_client, maybe_print_json, pretty_table};

const LATEST_URL: &str = "https://api.frankfurter.dev/v1/latest?base=USD&symbols=TRY,AED";

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("fetch", _)) => fetch_rates(kv)?,
        Some(("show", sub)) => show(kv, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Latest {
    base: String,
    rates: HashMap<String, Decimal>,
}

/// Fold a Frankfurter `latest` response into the cache. Rates the response
/// does not carry keep their previous value; the gold price is never touched.
pub fn apply_latest(cache: &mut MarketCache, body: &str) -> Result<()> {
    let latest: Latest = serde_json::from_str(body).context("Unexpected FX response")?;
    if !latest.base.eq_ignore_ascii_case("USD") {
        bail!("FX response is based on {}, expected USD", latest.base);
    }
    if let Some(r) = latest.rates.get("TRY") {
        cache.usd_tl = Some(r.round_dp(4));
    }
    if let Some(r) = latest.rates.get("AED") {
        cache.usd_aed = Some(r.round_dp(4));
    }
    cache.fetched_at = Some(Utc::now());
    Ok(())
}

fn fetch_rates(kv: &KvStore) -> Result<()> {
    let client = http_client()?;
    let body = client.get(LATEST_URL).send()?.error_for_status()?.text()?;
    let mut st = load_for_update(kv)?;
    apply_latest(&mut st.market, &body)?;
    persist(kv, &st)?;
    println!("FX rates fetched via Frankfurter (ECB).");
    Ok(())
}

fn show(kv: &KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let market = load_app_state(kv).market;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &market)? {
        return Ok(());
    }
    let fmt = |v: Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
    let rows = vec![
        vec!["USD/TL".into(), fmt(market.usd_tl)],
        vec!["USD/AED".into(), fmt(market.usd_aed)],
        vec!["Gold g/TL".into(), fmt(market.gold_gram_tl)],
        vec![
            "Fetched".into(),
            market
                .fetched_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".into()),
        ],
    ];
    println!("{}", pretty_table(&["Quote", "Rate"], rows));
    Ok(())
}
