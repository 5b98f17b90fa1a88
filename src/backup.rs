// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Backup codes: a compact JSON projection of [`AppState`] meant to be copied
//! and pasted by hand.
//!
//! Records are positional arrays instead of keyed objects. Each record type
//! has one field table (position, name, encoder, decoder) that drives both
//! directions, so packing and unpacking cannot disagree about positions.
//!
//! The projection is lossy on purpose: strings are cut to fixed lengths, the
//! market cache and buy rate snapshots are dropped, ids are regenerated on
//! unpack, and timestamps keep second precision.

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::{Map, Value, json};

use crate::models::{
    AppState, AssetKind, Buy, Categories, ChecklistItem, Currency, Note, STATE_KEYS, Todo,
    Transaction, TxnType,
};
use crate::utils::{iso19, parse_iso, truncate_chars};

pub const BACKUP_VERSION: i64 = 1;

pub const CATEGORY_MAX: usize = 48;
pub const TEXT_MAX: usize = 120;
pub const TAG_MAX: usize = 32;
pub const BODY_MAX: usize = 4000;
pub const PHOTOS_MAX: usize = 12;

/// Keys whose presence marks an object as a compact backup code.
const COMPACT_MARKERS: &[&str] = &["v", "c", "x", "b", "o", "n"];

static NULL: Value = Value::Null;

struct Field<R> {
    name: &'static str,
    encode: fn(&R) -> Value,
    decode: fn(&mut R, &Value),
}

fn text(v: &Value) -> String {
    v.as_str().unwrap_or_default().to_string()
}

fn int(v: &Value) -> i64 {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f.round() as i64))
        .unwrap_or(0)
}

fn flag(b: bool) -> Value {
    json!(b as u8)
}

fn num(d: Decimal) -> Value {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return json!(i);
        }
    }
    d.to_f64().map(|f| json!(f)).unwrap_or_else(|| json!(0))
}

fn dec(v: &Value) -> Decimal {
    if let Some(i) = v.as_i64() {
        return Decimal::from(i);
    }
    v.as_f64()
        .and_then(Decimal::from_f64)
        .map(|d| d.normalize())
        .unwrap_or(Decimal::ZERO)
}

/// Integer count of `10^-dp` units. Values too large for that are written as
/// a plain float instead, which `unscaled` tells apart by its JSON type.
fn scaled(d: Decimal, dp: u32) -> Value {
    let factor = Decimal::from(10_i64.pow(dp));
    match d.checked_mul(factor).and_then(|m| m.round().to_i64()) {
        Some(units) => json!(units),
        None => {
            warn!("{} does not fit {} decimal places, packed as float", d, dp);
            d.to_f64().map(|f| json!(f)).unwrap_or_else(|| json!(0))
        }
    }
}

fn unscaled(v: &Value, dp: u32) -> Decimal {
    if v.is_f64() {
        return dec(v);
    }
    Decimal::new(int(v), dp).normalize()
}

fn cut(s: &str, max: usize) -> Value {
    json!(truncate_chars(s, max))
}

const TXN_FIELDS: &[Field<Transaction>] = &[
    Field {
        name: "at",
        encode: |t: &Transaction| json!(iso19(&t.at)),
        decode: |t: &mut Transaction, v: &Value| t.at = parse_iso(&text(v)),
    },
    Field {
        name: "type",
        encode: |t: &Transaction| json!((t.kind == TxnType::Expense) as u8),
        decode: |t: &mut Transaction, v: &Value| {
            t.kind = if int(v) == 1 {
                TxnType::Expense
            } else {
                TxnType::Income
            }
        },
    },
    Field {
        name: "amount",
        encode: |t: &Transaction| json!(t.amount),
        decode: |t: &mut Transaction, v: &Value| t.amount = int(v).max(0) as u64,
    },
    Field {
        name: "currency",
        encode: |t: &Transaction| json!(t.currency.code()),
        decode: |t: &mut Transaction, v: &Value| t.currency = Currency::from_code(int(v)),
    },
    Field {
        name: "category",
        encode: |t: &Transaction| cut(&t.category, CATEGORY_MAX),
        decode: |t: &mut Transaction, v: &Value| t.category = text(v),
    },
    Field {
        name: "note",
        encode: |t: &Transaction| cut(&t.note, TEXT_MAX),
        decode: |t: &mut Transaction, v: &Value| t.note = text(v),
    },
    Field {
        name: "gold",
        encode: |t: &Transaction| flag(t.is_gold()),
        decode: |t: &mut Transaction, v: &Value| {
            if int(v) == 1 {
                t.asset = Some(AssetKind::Gold);
            }
        },
    },
    Field {
        name: "grams",
        encode: |t: &Transaction| num(t.grams.unwrap_or(Decimal::ZERO)),
        decode: |t: &mut Transaction, v: &Value| {
            let g = dec(v);
            if !g.is_zero() {
                t.grams = Some(g);
            }
        },
    },
];

const BUY_FIELDS: &[Field<Buy>] = &[
    Field {
        name: "at",
        encode: |b: &Buy| json!(iso19(&b.at)),
        decode: |b: &mut Buy, v: &Value| b.at = parse_iso(&text(v)),
    },
    Field {
        name: "asset",
        encode: |b: &Buy| json!(b.asset.code()),
        decode: |b: &mut Buy, v: &Value| b.asset = AssetKind::from_code(int(v)),
    },
    Field {
        name: "tlSpent",
        encode: |b: &Buy| scaled(b.tl_spent, 2),
        decode: |b: &mut Buy, v: &Value| b.tl_spent = unscaled(v, 2),
    },
    Field {
        name: "qty",
        encode: |b: &Buy| scaled(b.qty, 4),
        decode: |b: &mut Buy, v: &Value| b.qty = unscaled(v, 4),
    },
];

const TODO_FIELDS: &[Field<Todo>] = &[
    Field {
        name: "text",
        encode: |t: &Todo| cut(&t.text, TEXT_MAX),
        decode: |t: &mut Todo, v: &Value| t.text = text(v),
    },
    Field {
        name: "tag",
        encode: |t: &Todo| cut(&t.tag, TAG_MAX),
        decode: |t: &mut Todo, v: &Value| t.tag = text(v),
    },
    Field {
        name: "done",
        encode: |t: &Todo| flag(t.done),
        decode: |t: &mut Todo, v: &Value| t.done = int(v) == 1,
    },
    Field {
        name: "at",
        encode: |t: &Todo| json!(iso19(&t.at)),
        decode: |t: &mut Todo, v: &Value| t.at = parse_iso(&text(v)),
    },
];

const CHECK_FIELDS: &[Field<ChecklistItem>] = &[
    Field {
        name: "text",
        encode: |c: &ChecklistItem| cut(&c.text, TEXT_MAX),
        decode: |c: &mut ChecklistItem, v: &Value| c.text = text(v),
    },
    Field {
        name: "done",
        encode: |c: &ChecklistItem| flag(c.done),
        decode: |c: &mut ChecklistItem, v: &Value| c.done = int(v) == 1,
    },
];

const NOTE_FIELDS: &[Field<Note>] = &[
    Field {
        name: "title",
        encode: |n: &Note| cut(&n.title, TEXT_MAX),
        decode: |n: &mut Note, v: &Value| n.title = text(v),
    },
    Field {
        name: "tag",
        encode: |n: &Note| cut(&n.tag, TAG_MAX),
        decode: |n: &mut Note, v: &Value| n.tag = text(v),
    },
    Field {
        name: "body",
        encode: |n: &Note| cut(&n.body, BODY_MAX),
        decode: |n: &mut Note, v: &Value| n.body = text(v),
    },
    Field {
        name: "at",
        encode: |n: &Note| json!(iso19(&n.at)),
        decode: |n: &mut Note, v: &Value| n.at = parse_iso(&text(v)),
    },
    Field {
        name: "checklist",
        encode: |n: &Note| {
            Value::Array(n.checklist.iter().map(|c| pack_record(CHECK_FIELDS, c)).collect())
        },
        decode: |n: &mut Note, v: &Value| {
            n.checklist = unpack_list(v, CHECK_FIELDS, || ChecklistItem::new(""))
        },
    },
    Field {
        name: "photos",
        encode: |n: &Note| json!(n.photos.iter().take(PHOTOS_MAX).collect::<Vec<_>>()),
        decode: |n: &mut Note, v: &Value| {
            n.photos = v
                .as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(|p| p.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        },
    },
];

fn pack_record<R>(fields: &[Field<R>], record: &R) -> Value {
    Value::Array(fields.iter().map(|f| (f.encode)(record)).collect())
}

/// Missing trailing positions decode as `null`; non-array input is skipped.
fn unpack_record<R>(fields: &[Field<R>], packed: &Value, mut record: R) -> Option<R> {
    let arr = packed.as_array()?;
    for (i, f) in fields.iter().enumerate() {
        let v = arr.get(i).unwrap_or_else(|| {
            debug!("packed record has no '{}' at {}", f.name, i);
            &NULL
        });
        (f.decode)(&mut record, v);
    }
    Some(record)
}

fn pack_list<R>(fields: &[Field<R>], records: &[R]) -> Value {
    Value::Array(records.iter().map(|r| pack_record(fields, r)).collect())
}

fn unpack_list<R>(v: &Value, fields: &[Field<R>], blank: impl Fn() -> R) -> Vec<R> {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| unpack_record(fields, item, blank()))
                .collect()
        })
        .unwrap_or_default()
}

/// Project a state into a backup code. Default or empty fields are omitted.
pub fn pack(state: &AppState) -> Value {
    let mut out = Map::new();
    out.insert("v".into(), json!(BACKUP_VERSION));
    if !state.usd.is_zero() {
        out.insert("u".into(), num(state.usd));
    }
    if !state.goal_usd.is_zero() {
        out.insert("g".into(), num(state.goal_usd));
    }
    if !state.gold_grams.is_zero() {
        out.insert("gg".into(), num(state.gold_grams));
    }
    if !state.target_date.is_empty() {
        out.insert("td".into(), json!(state.target_date));
    }
    if state.categories != Categories::default() {
        out.insert(
            "c".into(),
            json!([state.categories.income, state.categories.expense]),
        );
    }
    if !state.txns.is_empty() {
        out.insert("x".into(), pack_list(TXN_FIELDS, &state.txns));
    }
    if !state.buys.is_empty() {
        out.insert("b".into(), pack_list(BUY_FIELDS, &state.buys));
    }
    if !state.todos.is_empty() {
        out.insert("o".into(), pack_list(TODO_FIELDS, &state.todos));
    }
    if !state.notes.is_empty() {
        out.insert("n".into(), pack_list(NOTE_FIELDS, &state.notes));
    }
    Value::Object(out)
}

fn string_list(v: Option<&Value>) -> Option<Vec<String>> {
    v?.as_array().map(|a| {
        a.iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect()
    })
}

fn unpack_compact(obj: &Map<String, Value>) -> AppState {
    let version = obj.get("v").map(int).unwrap_or(BACKUP_VERSION);
    if version > BACKUP_VERSION {
        warn!("backup code version {} is newer than {}", version, BACKUP_VERSION);
    }

    let mut st = AppState::default();
    if let Some(v) = obj.get("u") {
        st.usd = dec(v);
    }
    if let Some(v) = obj.get("g") {
        st.goal_usd = dec(v);
    }
    if let Some(v) = obj.get("gg") {
        st.gold_grams = dec(v);
    }
    if let Some(v) = obj.get("td") {
        st.target_date = text(v);
    }
    if let Some(c) = obj.get("c").and_then(Value::as_array) {
        if let (Some(income), Some(expense)) = (string_list(c.first()), string_list(c.get(1))) {
            st.categories = Categories { income, expense };
        }
    }
    if let Some(v) = obj.get("x") {
        st.txns = unpack_list(v, TXN_FIELDS, Transaction::blank);
    }
    if let Some(v) = obj.get("b") {
        st.buys = unpack_list(v, BUY_FIELDS, Buy::blank);
    }
    if let Some(v) = obj.get("o") {
        st.todos = unpack_list(v, TODO_FIELDS, Todo::blank);
    }
    if let Some(v) = obj.get("n") {
        st.notes = unpack_list(v, NOTE_FIELDS, Note::blank);
    }
    st
}

/// Turn any accepted input shape into a state document.
///
/// Tried in order: the legacy `{state: {...}}` wrapper (returned untouched),
/// a compact backup code, a raw state object. Anything else is `None`.
pub fn unpack(input: &Value) -> Option<Value> {
    let obj = input.as_object()?;
    if let Some(inner) = obj.get("state").filter(|s| s.is_object()) {
        return Some(inner.clone());
    }
    if COMPACT_MARKERS.iter().any(|k| obj.contains_key(*k)) {
        return Some(unpack_compact(obj).to_document());
    }
    if STATE_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Some(input.clone());
    }
    None
}

pub fn encode(state: &AppState) -> String {
    pack(state).to_string()
}

/// `None` for text that is not JSON or not an accepted shape.
pub fn decode(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(v) => unpack(&v),
        Err(e) => {
            warn!("backup code is not JSON: {}", e);
            None
        }
    }
}

pub fn decode_state(text: &str) -> Option<AppState> {
    decode(text).map(|doc| AppState::heal(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_have_declared_widths() {
        assert_eq!(TXN_FIELDS.len(), 8);
        assert_eq!(BUY_FIELDS.len(), 4);
        assert_eq!(TODO_FIELDS.len(), 4);
        assert_eq!(NOTE_FIELDS.len(), 6);
        assert_eq!(CHECK_FIELDS.len(), 2);
    }

    #[test]
    fn short_rows_decode_with_defaults() {
        let t = unpack_record(TXN_FIELDS, &json!(["", 1, 20]), Transaction::blank()).unwrap();
        assert_eq!(t.kind, TxnType::Expense);
        assert_eq!(t.amount, 20);
        assert_eq!(t.currency, Currency::Usd);
        assert!(t.category.is_empty());
        assert!(unpack_record(TXN_FIELDS, &json!("x"), Transaction::blank()).is_none());
    }

    #[test]
    fn scaled_decimals_are_exact() {
        let d = Decimal::new(123456, 4); // 12.3456
        assert_eq!(scaled(d, 4), json!(123456));
        assert_eq!(unscaled(&json!(123456), 4), d);
        assert_eq!(scaled(Decimal::new(150075, 2), 2), json!(150075));
    }

    #[test]
    fn oversized_scaled_values_fall_back_to_floats() {
        let big = Decimal::from(100_000_000_000_000_000_i64); // 1e17
        let packed = scaled(big, 2);
        assert!(packed.is_f64());
        assert_eq!(unscaled(&packed, 2), big);
        assert!(scaled(Decimal::MAX, 4).is_f64());
    }

    #[test]
    fn numbers_stay_integral_when_possible() {
        assert_eq!(num(Decimal::new(500, 0)), json!(500));
        assert_eq!(num(Decimal::new(25, 1)), json!(2.5));
        assert_eq!(dec(&json!(2.5)), Decimal::new(25, 1));
        assert_eq!(dec(&json!("x")), Decimal::ZERO);
    }
}
