// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use pocketvault::keys;
use pocketvault::kv::KvStore;
use pocketvault::ledger::{self, NewTransaction};
use pocketvault::models::{AppState, Currency, TxnType};
use pocketvault::state::load_app_state;
use pocketvault::{cli, commands::transactions};
use rust_decimal::Decimal;

fn setup() -> AppState {
    let mut st = AppState::default();
    for i in 1..=3 {
        ledger::add_transaction(
            &mut st,
            NewTransaction {
                kind: TxnType::Expense,
                currency: Currency::Usd,
                amount: 10,
                category: "Yemek".into(),
                note: String::new(),
                at: Some(Utc.with_ymd_and_hms(2025, 1, i, 12, 0, 0).unwrap()),
                gold_grams: None,
            },
        )
        .unwrap();
    }
    st
}

#[test]
fn list_limit_respected() {
    let st = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["pocketvault", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&st, list_m);
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].at, "2025-01-03T12:00:00");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_from_cli_persists_gold_income() {
    let kv = KvStore::in_memory();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketvault",
        "tx",
        "add",
        "--type",
        "income",
        "--grams",
        "2.5",
        "--category",
        "Hediye",
        "--date",
        "2025-02-01",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(&kv, tx_m).unwrap();
    } else {
        panic!("no tx subcommand");
    }
    let st = load_app_state(&kv);
    assert_eq!(st.txns.len(), 1);
    assert!(st.txns[0].is_gold());
    assert_eq!(st.gold_grams, Decimal::new(25, 1));
    assert_eq!(
        st.txns[0].at,
        Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap()
    );
}

#[test]
fn add_from_cli_rejects_unknown_currency() {
    let kv = KvStore::in_memory();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketvault",
        "tx",
        "add",
        "--type",
        "expense",
        "--amount",
        "5",
        "--currency",
        "EUR",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        assert!(transactions::handle(&kv, tx_m).is_err());
    } else {
        panic!("no tx subcommand");
    }
    assert!(load_app_state(&kv).txns.is_empty());
}

#[test]
fn add_refuses_to_overwrite_an_unreadable_state() {
    let kv = KvStore::in_memory();
    let broken = r#"{"usd": 900, "txns": [ BROKEN"#;
    kv.set(keys::STATE, broken);
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketvault",
        "tx",
        "add",
        "--type",
        "income",
        "--amount",
        "5",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        assert!(transactions::handle(&kv, tx_m).is_err());
    } else {
        panic!("no tx subcommand");
    }
    assert_eq!(kv.get(keys::STATE).as_deref(), Some(broken));
}
