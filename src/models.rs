// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Aed,
    Tl,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Aed => "AED",
            Currency::Tl => "TL",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "AED" => Some(Currency::Aed),
            "TL" | "TRY" => Some(Currency::Tl),
            _ => None,
        }
    }

    /// Compact code used in backup codes.
    pub fn code(&self) -> u8 {
        match self {
            Currency::Usd => 0,
            Currency::Aed => 1,
            Currency::Tl => 2,
        }
    }

    /// Unknown codes decode as USD.
    pub fn from_code(n: i64) -> Self {
        match n {
            1 => Currency::Aed,
            2 => Currency::Tl,
            _ => Currency::Usd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    #[default]
    Income,
    Expense,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Income => "income",
            TxnType::Expense => "expense",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Some(TxnType::Income),
            "expense" | "out" => Some(TxnType::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetKind {
    #[default]
    Usd,
    Gold,
    #[serde(other)]
    Other,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Usd => "USD",
            AssetKind::Gold => "GOLD",
            AssetKind::Other => "OTHER",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Some(AssetKind::Usd),
            "GOLD" | "XAU" => Some(AssetKind::Gold),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            AssetKind::Usd => 0,
            AssetKind::Gold => 1,
            AssetKind::Other => 2,
        }
    }

    pub fn from_code(n: i64) -> Self {
        match n {
            0 => AssetKind::Usd,
            1 => AssetKind::Gold,
            _ => AssetKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TxnType,
    #[serde(default)]
    pub currency: Currency,
    pub amount: u64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub note: String,
    pub at: DateTime<Utc>,
    /// Set to `Gold` when the income was received as gold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetKind>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub grams: Option<Decimal>,
}

impl Transaction {
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            kind: TxnType::Income,
            currency: Currency::Usd,
            amount: 0,
            category: String::new(),
            note: String::new(),
            at: Utc::now(),
            asset: None,
            grams: None,
        }
    }

    pub fn is_gold(&self) -> bool {
        self.asset == Some(AssetKind::Gold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buy {
    pub id: String,
    pub asset: AssetKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub tl_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub qty: Decimal,
    pub at: DateTime<Utc>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub rate_usd_tl_at: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub gold_gram_tl_at: Decimal,
}

impl Buy {
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            asset: AssetKind::Usd,
            tl_spent: Decimal::ZERO,
            qty: Decimal::ZERO,
            at: Utc::now(),
            rate_usd_tl_at: Decimal::ZERO,
            gold_gram_tl_at: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub body: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Note {
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            title: String::new(),
            tag: String::new(),
            body: String::new(),
            at: Utc::now(),
            checklist: Vec::new(),
            photos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub done: bool,
    pub at: DateTime<Utc>,
}

impl Todo {
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            tag: String::new(),
            done: false,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub income: Vec<String>,
    #[serde(default)]
    pub expense: Vec<String>,
}

impl Default for Categories {
    fn default() -> Self {
        let s = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        Self {
            income: s(&["Maaş", "Ek Gelir", "Hediye", "Diğer"]),
            expense: s(&["Ulaşım", "Konaklama", "Yemek", "Vize", "Alışveriş", "Diğer"]),
        }
    }
}

/// Last fetched market data. Never carried in backup codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCache {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub usd_tl: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub usd_aed: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub gold_gram_tl: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

/// The canonical application document. Unknown keys survive a load/save
/// cycle through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub lang: String,
    pub theme: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub aed: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tl: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gold_grams: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub goal_usd: Decimal,
    pub target_date: String,
    pub categories: Categories,
    pub txns: Vec<Transaction>,
    pub buys: Vec<Buy>,
    pub notes: Vec<Note>,
    pub todos: Vec<Todo>,
    pub market: MarketCache,
    pub news: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            lang: "tr".to_string(),
            theme: "dark".to_string(),
            usd: Decimal::ZERO,
            aed: Decimal::ZERO,
            tl: Decimal::ZERO,
            gold_grams: Decimal::ZERO,
            goal_usd: Decimal::ZERO,
            target_date: String::new(),
            categories: Categories::default(),
            txns: Vec::new(),
            buys: Vec::new(),
            notes: Vec::new(),
            todos: Vec::new(),
            market: MarketCache::default(),
            news: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Top-level keys a state document may carry; used to recognise raw state
/// objects.
pub const STATE_KEYS: &[&str] = &[
    "lang",
    "theme",
    "usd",
    "aed",
    "tl",
    "goldGrams",
    "goalUsd",
    "targetDate",
    "categories",
    "txns",
    "buys",
    "notes",
    "todos",
    "market",
    "news",
];

impl AppState {
    /// Merge a stored document over a complete default state. Fields that
    /// fail to decode keep their defaults; everything else is taken as-is.
    pub fn heal(doc: &Value) -> Self {
        let Some(obj) = doc.as_object() else {
            return Self::default();
        };
        if let Ok(state) = serde_json::from_value::<Self>(doc.clone()) {
            return state;
        }
        let mut merged = Map::new();
        for (k, v) in obj {
            let mut trial = merged.clone();
            trial.insert(k.clone(), v.clone());
            if serde_json::from_value::<Self>(Value::Object(trial)).is_ok() {
                merged.insert(k.clone(), v.clone());
            } else {
                warn!("state field '{}' unreadable, using default", k);
            }
        }
        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
