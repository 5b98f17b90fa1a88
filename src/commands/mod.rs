// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod backend;
pub mod backup;
pub mod buys;
pub mod doctor;
pub mod exporter;
pub mod files;
pub mod market;
pub mod notes;
pub mod snapshots;
pub mod state;
pub mod todos;
pub mod transactions;

use anyhow::{Context, Result};

use crate::kv::KvStore;
use crate::models::AppState;

/// The current state for a read-modify-write command. A stored document
/// that cannot be read is an error rather than an empty state.
pub fn load_for_update(kv: &KvStore) -> Result<AppState> {
    crate::state::try_load_app_state(kv)
        .context("Stored state is unreadable; fix it or run `state import` first")
}

/// Write the state back, turning a failed write into a command error.
pub fn persist(kv: &KvStore, st: &AppState) -> Result<()> {
    crate::state::try_save_state(kv, st).context("Could not write state")
}
