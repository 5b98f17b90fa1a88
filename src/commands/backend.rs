// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::kv::KvStore;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(kv: &KvStore, m: &clap::ArgMatches) -> Result<()> {
    let report = kv.report();
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report.entries)? {
        return Ok(());
    }
    let active = kv.active();
    let rows: Vec<Vec<String>> = report
        .entries
        .iter()
        .map(|e| {
            let status = if e.kind == active {
                "active"
            } else if e.available {
                "fallback"
            } else {
                "unavailable"
            };
            vec![e.kind.to_string(), status.to_string(), e.detail.clone()]
        })
        .collect();
    println!("{}", pretty_table(&["Backend", "Status", "Detail"], rows));
    Ok(())
}
