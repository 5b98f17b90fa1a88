// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use pocketvault::backup::{self, CATEGORY_MAX, TEXT_MAX};
use pocketvault::ledger::{self, NewTransaction};
use pocketvault::models::{
    AppState, AssetKind, Categories, ChecklistItem, Currency, Note, Todo, TxnType,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn salary_state() -> AppState {
    let mut st = AppState::default();
    ledger::add_transaction(
        &mut st,
        NewTransaction {
            kind: TxnType::Income,
            currency: Currency::Usd,
            amount: 500,
            category: "Maaş".into(),
            note: String::new(),
            at: Some(Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()),
            gold_grams: None,
        },
    )
    .unwrap();
    st
}

#[test]
fn salary_packs_to_a_positional_row() {
    let packed = backup::pack(&salary_state());
    assert_eq!(
        packed["x"],
        json!([["2025-01-15T10:00:00", 0, 500, 0, "Maaş", "", 0, 0]])
    );
    assert_eq!(packed["v"], json!(1));
    assert_eq!(packed["u"], json!(500));
}

#[test]
fn positional_row_unpacks_to_income() {
    let doc = backup::unpack(&json!({
        "v": 1,
        "x": [["2025-01-15T10:00:00", 0, 500, 0, "Maaş", "", 0, 0]]
    }))
    .unwrap();
    let st = AppState::heal(&doc);
    let t = &st.txns[0];
    assert_eq!(t.kind, TxnType::Income);
    assert_eq!(t.amount, 500);
    assert_eq!(t.currency, Currency::Usd);
    assert_eq!(t.category, "Maaş");
    assert_eq!(t.at, Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap());
}

#[test]
fn currency_codes_map_both_ways() {
    for (code, ccy) in [(0, Currency::Usd), (1, Currency::Aed), (2, Currency::Tl)] {
        let doc = backup::unpack(&json!({"x": [["", 1, 10, code, "", "", 0, 0]]})).unwrap();
        let st = AppState::heal(&doc);
        assert_eq!(st.txns[0].currency, ccy);
        assert_eq!(ccy.code(), code as u8);
    }
}

#[test]
fn legacy_wrapper_is_returned_unchanged() {
    assert_eq!(
        backup::unpack(&json!({"state": {"usd": 100}})),
        Some(json!({"usd": 100}))
    );
}

#[test]
fn non_objects_and_unknown_shapes_are_rejected() {
    assert_eq!(backup::unpack(&Value::Null), None);
    assert_eq!(backup::unpack(&json!("not an object")), None);
    assert_eq!(backup::unpack(&json!({"hello": 1})), None);
    assert_eq!(backup::decode("{nope"), None);
}

#[test]
fn raw_state_objects_pass_through() {
    let raw = json!({"usd": 10, "lang": "en"});
    assert_eq!(backup::unpack(&raw), Some(raw.clone()));
}

#[test]
fn defaults_are_omitted() {
    let packed = backup::pack(&AppState::default());
    assert_eq!(packed, json!({"v": 1}));

    let mut st = AppState::default();
    st.categories = Categories {
        income: vec!["Salary".into()],
        expense: vec!["Rent".into()],
    };
    let packed = backup::pack(&st);
    assert_eq!(packed["c"], json!([["Salary"], ["Rent"]]));
}

#[test]
fn strings_are_cut_to_their_limits() {
    let mut st = salary_state();
    st.txns[0].category = "k".repeat(100);
    st.txns[0].note = "n".repeat(500);
    let packed = backup::pack(&st);
    let row = &packed["x"][0];
    assert_eq!(row[4].as_str().unwrap().chars().count(), CATEGORY_MAX);
    assert_eq!(row[5].as_str().unwrap().chars().count(), TEXT_MAX);
}

#[test]
fn round_trip_keeps_values_and_renews_ids() {
    let mut st = salary_state();
    st.goal_usd = Decimal::from(10_000);
    st.target_date = "2025-12-31".into();
    st.market.usd_tl = Some(Decimal::new(3550, 2));
    ledger::add_transaction(
        &mut st,
        NewTransaction {
            kind: TxnType::Income,
            currency: Currency::Usd,
            amount: 0,
            category: "Hediye".into(),
            note: "bilezik".into(),
            at: None,
            gold_grams: Some(Decimal::new(125, 1)),
        },
    )
    .unwrap();
    st.tl = Decimal::from(10_000);
    ledger::add_buy(
        &mut st,
        AssetKind::Usd,
        Decimal::new(355_025, 2),
        Decimal::new(1_000_000, 4),
        None,
    )
    .unwrap();
    st.todos.push(Todo {
        text: "Vize randevusu".into(),
        tag: "trip".into(),
        done: true,
        ..Todo::blank()
    });
    st.notes.push(Note {
        title: "Packing".into(),
        body: "passport".into(),
        checklist: vec![ChecklistItem::new("charger")],
        photos: vec!["file:///p.jpg".into()],
        ..Note::blank()
    });

    let code = backup::encode(&st);
    let back = backup::decode_state(&code).unwrap();

    assert_eq!(back.usd, st.usd);
    assert_eq!(back.goal_usd, Decimal::from(10_000));
    assert_eq!(back.gold_grams, Decimal::new(125, 1));
    assert_eq!(back.target_date, "2025-12-31");
    assert_eq!(back.market.usd_tl, None);

    assert_eq!(back.txns.len(), 2);
    assert!(back.txns[0].is_gold());
    assert_eq!(back.txns[0].grams, Some(Decimal::new(125, 1)));
    assert_ne!(back.txns[1].id, st.txns[1].id);
    assert_eq!(back.txns[1].category, "Maaş");

    assert_eq!(back.buys[0].asset, AssetKind::Usd);
    assert_eq!(back.buys[0].tl_spent, Decimal::new(355_025, 2));
    assert_eq!(back.buys[0].qty, Decimal::from(100));

    assert!(back.todos[0].done);
    assert_eq!(back.todos[0].tag, "trip");
    assert_eq!(back.notes[0].checklist[0].text, "charger");
    assert_eq!(back.notes[0].photos, vec!["file:///p.jpg".to_string()]);
}

#[test]
fn huge_buy_amounts_survive_encoding() {
    let mut st = AppState::default();
    let spent = Decimal::from(100_000_000_000_000_000_i64); // 1e17, past i64 as hundredths
    ledger::add_buy(&mut st, AssetKind::Usd, spent, Decimal::ONE, None).unwrap();
    let back = backup::decode_state(&backup::encode(&st)).unwrap();
    assert_eq!(back.buys[0].tl_spent, spent);
    assert_eq!(back.buys[0].qty, Decimal::ONE);

    let mut st = AppState::default();
    let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    ledger::add_buy(&mut st, AssetKind::Gold, huge, Decimal::ONE, None).unwrap();
    let back = backup::decode_state(&backup::encode(&st)).unwrap();
    let drift = ((back.buys[0].tl_spent - huge) / huge).abs();
    assert!(drift < Decimal::new(1, 9));
}
