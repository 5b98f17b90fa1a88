// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The single canonical state document.
//!
//! This layer is schema-agnostic: it stores and returns JSON documents and
//! never migrates them. Healing old or partial documents is
//! [`AppState::heal`]'s job.

use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::keys;
use crate::kv::KvStore;
use crate::models::AppState;

pub fn try_load_state(kv: &KvStore) -> Result<Value> {
    let raw = kv
        .try_get(keys::STATE)?
        .ok_or_else(|| StoreError::not_found(keys::STATE))?;
    Ok(serde_json::from_str(&raw)?)
}

/// `None` when nothing is stored or the stored text is not JSON.
pub fn load_state(kv: &KvStore) -> Option<Value> {
    match try_load_state(kv) {
        Ok(v) => Some(v),
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            warn!("load state failed: {}", e);
            None
        }
    }
}

/// Load and heal over defaults. A missing or broken document yields the
/// default state.
pub fn load_app_state(kv: &KvStore) -> AppState {
    load_state(kv)
        .map(|doc| AppState::heal(&doc))
        .unwrap_or_default()
}

/// Like [`load_app_state`], but only a missing document yields the default.
/// Unreadable or unparsable documents are errors, so a caller about to write
/// does not replace them with a fresh state.
pub fn try_load_app_state(kv: &KvStore) -> Result<AppState> {
    match try_load_state(kv) {
        Ok(doc) => Ok(AppState::heal(&doc)),
        Err(e) if e.is_not_found() => Ok(AppState::default()),
        Err(e) => Err(e),
    }
}

pub fn try_save_state<T: Serialize + ?Sized>(kv: &KvStore, state: &T) -> Result<()> {
    kv.set_json(keys::STATE, state)
}

pub fn save_state<T: Serialize + ?Sized>(kv: &KvStore, state: &T) -> bool {
    match try_save_state(kv, state) {
        Ok(()) => true,
        Err(e) => {
            warn!("save state failed: {}", e);
            false
        }
    }
}

pub fn try_clear_state(kv: &KvStore) -> Result<()> {
    kv.try_remove(keys::STATE)
}

pub fn clear_state(kv: &KvStore) -> bool {
    match try_clear_state(kv) {
        Ok(()) => true,
        Err(e) => {
            warn!("clear state failed: {}", e);
            false
        }
    }
}
