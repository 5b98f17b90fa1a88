// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory mutations of [`AppState`]. Transactions and buys move balances
//! when added and move them back when deleted; notes and todos are edited in
//! place. Persisting the result is the caller's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{Result, StoreError};
use crate::models::{
    AppState, AssetKind, Buy, ChecklistItem, Currency, Note, Todo, Transaction, TxnType,
};
use crate::utils::new_id;

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TxnType,
    pub currency: Currency,
    pub amount: u64,
    pub category: String,
    pub note: String,
    pub at: Option<DateTime<Utc>>,
    /// Grams of gold received; only valid for income.
    pub gold_grams: Option<Decimal>,
}

fn balance_mut(st: &mut AppState, ccy: Currency) -> &mut Decimal {
    match ccy {
        Currency::Usd => &mut st.usd,
        Currency::Aed => &mut st.aed,
        Currency::Tl => &mut st.tl,
    }
}

/// `sign` is +1 to apply, -1 to reverse.
fn apply_transaction(st: &mut AppState, t: &Transaction, sign: i64) {
    let dir = match t.kind {
        TxnType::Income => Decimal::from(sign),
        TxnType::Expense => Decimal::from(-sign),
    };
    if t.is_gold() {
        st.gold_grams += t.grams.unwrap_or(Decimal::ZERO) * dir;
    } else {
        *balance_mut(st, t.currency) += Decimal::from(t.amount) * dir;
    }
}

pub fn add_transaction(st: &mut AppState, input: NewTransaction) -> Result<&Transaction> {
    let gold = match input.gold_grams {
        Some(g) if g <= Decimal::ZERO => {
            return Err(StoreError::validation("gold grams must be positive"));
        }
        Some(_) if input.kind == TxnType::Expense => {
            return Err(StoreError::validation("gold can only be recorded as income"));
        }
        Some(g) => Some(g.round_dp(4)),
        None => None,
    };
    if gold.is_none() && input.amount == 0 {
        return Err(StoreError::validation("amount must be positive"));
    }
    let t = Transaction {
        id: new_id(),
        kind: input.kind,
        currency: input.currency,
        amount: input.amount,
        category: input.category.trim().to_string(),
        note: input.note.trim().to_string(),
        at: input.at.unwrap_or_else(Utc::now),
        asset: gold.map(|_| AssetKind::Gold),
        grams: gold,
    };
    apply_transaction(st, &t, 1);
    st.txns.insert(0, t);
    Ok(&st.txns[0])
}

pub fn delete_transaction(st: &mut AppState, id: &str) -> Result<Transaction> {
    let pos = st
        .txns
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| StoreError::not_found(format!("transaction {}", id)))?;
    let t = st.txns.remove(pos);
    apply_transaction(st, &t, -1);
    Ok(t)
}

fn apply_buy(st: &mut AppState, b: &Buy, sign: i64) {
    let s = Decimal::from(sign);
    st.tl -= b.tl_spent * s;
    match b.asset {
        AssetKind::Usd => st.usd += b.qty * s,
        AssetKind::Gold => st.gold_grams += b.qty * s,
        AssetKind::Other => {}
    }
}

/// Spend TL on USD or gold. The current market cache is copied onto the
/// record for later reference.
pub fn add_buy(
    st: &mut AppState,
    asset: AssetKind,
    tl_spent: Decimal,
    qty: Decimal,
    at: Option<DateTime<Utc>>,
) -> Result<&Buy> {
    if asset == AssetKind::Other {
        return Err(StoreError::validation("only USD and GOLD can be bought"));
    }
    if tl_spent <= Decimal::ZERO || qty <= Decimal::ZERO {
        return Err(StoreError::validation("spent and quantity must be positive"));
    }
    let b = Buy {
        id: new_id(),
        asset,
        tl_spent: tl_spent.round_dp(2),
        qty: qty.round_dp(4),
        at: at.unwrap_or_else(Utc::now),
        rate_usd_tl_at: st.market.usd_tl.unwrap_or(Decimal::ZERO),
        gold_gram_tl_at: st.market.gold_gram_tl.unwrap_or(Decimal::ZERO),
    };
    apply_buy(st, &b, 1);
    st.buys.insert(0, b);
    Ok(&st.buys[0])
}

pub fn delete_buy(st: &mut AppState, id: &str) -> Result<Buy> {
    let pos = st
        .buys
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| StoreError::not_found(format!("buy {}", id)))?;
    let b = st.buys.remove(pos);
    apply_buy(st, &b, -1);
    Ok(b)
}

pub fn add_note<'a>(
    st: &'a mut AppState,
    title: &str,
    tag: &str,
    body: &str,
    checklist: &[String],
) -> Result<&'a Note> {
    if title.trim().is_empty() && body.trim().is_empty() {
        return Err(StoreError::validation("note needs a title or a body"));
    }
    let note = Note {
        id: new_id(),
        title: title.trim().to_string(),
        tag: tag.trim().to_string(),
        body: body.to_string(),
        at: Utc::now(),
        checklist: checklist
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| ChecklistItem::new(s.trim()))
            .collect(),
        photos: Vec::new(),
    };
    st.notes.insert(0, note);
    Ok(&st.notes[0])
}

#[derive(Debug, Clone, Default)]
pub struct NoteEdit {
    pub title: Option<String>,
    pub tag: Option<String>,
    pub body: Option<String>,
    pub add_photo: Option<String>,
}

fn note_mut<'a>(st: &'a mut AppState, id: &str) -> Result<&'a mut Note> {
    st.notes
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| StoreError::not_found(format!("note {}", id)))
}

pub fn edit_note<'a>(st: &'a mut AppState, id: &str, edit: NoteEdit) -> Result<&'a Note> {
    let note = note_mut(st, id)?;
    if let Some(t) = edit.title {
        note.title = t.trim().to_string();
    }
    if let Some(t) = edit.tag {
        note.tag = t.trim().to_string();
    }
    if let Some(b) = edit.body {
        note.body = b;
    }
    if let Some(p) = edit.add_photo {
        note.photos.push(p);
    }
    Ok(note)
}

/// Flip a checklist item, addressed by its position in the note.
pub fn toggle_checklist_item(st: &mut AppState, note_id: &str, index: usize) -> Result<bool> {
    let note = note_mut(st, note_id)?;
    let item = note.checklist.get_mut(index).ok_or_else(|| {
        StoreError::not_found(format!("checklist item {} in note {}", index, note_id))
    })?;
    item.done = !item.done;
    Ok(item.done)
}

pub fn add_todo<'a>(st: &'a mut AppState, text: &str, tag: &str) -> Result<&'a Todo> {
    if text.trim().is_empty() {
        return Err(StoreError::validation("todo text is empty"));
    }
    st.todos.insert(
        0,
        Todo {
            id: new_id(),
            text: text.trim().to_string(),
            tag: tag.trim().to_string(),
            done: false,
            at: Utc::now(),
        },
    );
    Ok(&st.todos[0])
}

pub fn toggle_todo(st: &mut AppState, id: &str) -> Result<bool> {
    let todo = st
        .todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| StoreError::not_found(format!("todo {}", id)))?;
    todo.done = !todo.done;
    Ok(todo.done)
}

pub fn delete_todo(st: &mut AppState, id: &str) -> Result<Todo> {
    let pos = st
        .todos
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| StoreError::not_found(format!("todo {}", id)))?;
    Ok(st.todos.remove(pos))
}
