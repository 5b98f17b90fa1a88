// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pocketvault::config::Config;
use pocketvault::kv::KvStore;
use pocketvault::{cli, commands, state};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::from_env()?;
    let kv = KvStore::open(&cfg);

    match matches.subcommand() {
        Some(("init", _)) => {
            match state::try_load_state(&kv) {
                Ok(_) => {}
                Err(e) if e.is_not_found() => commands::persist(&kv, &Default::default())?,
                Err(e) => return Err(e.into()),
            }
            println!("State ready on {} ({})", kv.active(), kv.report().summary());
        }
        Some(("backend", sub)) => commands::backend::handle(&kv, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&kv, &cfg)?,
        Some(("state", sub)) => commands::state::handle(&kv, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&kv, sub)?,
        Some(("buy", sub)) => commands::buys::handle(&kv, sub)?,
        Some(("note", sub)) => commands::notes::handle(&kv, sub)?,
        Some(("todo", sub)) => commands::todos::handle(&kv, sub)?,
        Some(("snapshot", sub)) => commands::snapshots::handle(&kv, &cfg, sub)?,
        Some(("file", sub)) => commands::files::handle(&kv, &cfg, sub)?,
        Some(("backup", sub)) => commands::backup::handle(&kv, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&kv, sub)?,
        Some(("market", sub)) => commands::market::handle(&kv, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
