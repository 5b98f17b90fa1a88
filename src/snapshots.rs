// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Named save slots kept in the KV store.
//!
//! The index (`keys::SNAPSHOT_INDEX`) is a newest-first JSON array of
//! [`SnapshotEntry`] capped at [`SNAPSHOT_CAP`]; each body lives under its own
//! `keys::snapshot(id)` key. Index updates are read-modify-write without
//! locking, so callers must not interleave them.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EvictionPolicy;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::kv::KvStore;
use crate::models::AppState;
use crate::utils::{new_id, truncate_chars};

pub const SNAPSHOT_CAP: usize = 50;
pub const NAME_MAX: usize = 40;
pub const SNAPSHOT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub name: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub version: String,
    pub state: Value,
}

impl Snapshot {
    pub fn new(name: &str, state: &AppState) -> Self {
        let at = Utc::now();
        Self {
            id: new_id(),
            name: snapshot_name(name, &at),
            at,
            version: SNAPSHOT_VERSION.to_string(),
            state: state.to_document(),
        }
    }

    /// Wrap an already-serialized state document.
    pub fn from_document(name: &str, state: Value) -> Self {
        let at = Utc::now();
        Self {
            id: new_id(),
            name: snapshot_name(name, &at),
            at,
            version: SNAPSHOT_VERSION.to_string(),
            state,
        }
    }

    pub fn entry(&self) -> SnapshotEntry {
        SnapshotEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            at: self.at,
            version: self.version.clone(),
        }
    }

    /// The stored document healed over defaults.
    pub fn app_state(&self) -> AppState {
        AppState::heal(&self.state)
    }
}

/// Trimmed, at most [`NAME_MAX`] characters, defaulted from the timestamp when
/// blank.
pub fn snapshot_name(raw: &str, at: &DateTime<Utc>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Snapshot {}", at.format("%Y-%m-%d %H:%M"))
    } else {
        truncate_chars(trimmed, NAME_MAX)
    }
}

/// Decode an index array, skipping entries that do not parse.
pub(crate) fn parse_index(raw: &str) -> Result<Vec<SnapshotEntry>> {
    let items: Vec<Value> = serde_json::from_str(raw)?;
    Ok(items
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

pub struct SnapshotStore<'a> {
    kv: &'a KvStore,
    eviction: EvictionPolicy,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(kv: &'a KvStore, eviction: EvictionPolicy) -> Self {
        Self { kv, eviction }
    }

    pub fn try_index(&self) -> Result<Vec<SnapshotEntry>> {
        match self.kv.try_get(keys::SNAPSHOT_INDEX)? {
            Some(raw) => parse_index(&raw),
            None => Ok(Vec::new()),
        }
    }

    pub fn index(&self) -> Vec<SnapshotEntry> {
        self.try_index().unwrap_or_else(|e| {
            warn!("snapshot index unreadable: {}", e);
            Vec::new()
        })
    }

    fn write_index(&self, index: &[SnapshotEntry]) -> Result<()> {
        self.kv.set_json(keys::SNAPSHOT_INDEX, index)
    }

    pub fn try_create(&self, name: &str, state: &AppState) -> Result<Snapshot> {
        // An unreadable index is left alone rather than replaced by one entry.
        let mut index = self.try_index()?;
        let snap = Snapshot::new(name, state);
        self.kv.set_json(&keys::snapshot(&snap.id), &snap)?;

        index.insert(0, snap.entry());
        if index.len() > SNAPSHOT_CAP {
            let evicted = index.split_off(SNAPSHOT_CAP);
            for old in &evicted {
                match self.eviction {
                    EvictionPolicy::DeleteBodies => {
                        self.kv.remove(&keys::snapshot(&old.id));
                        info!("evicted snapshot {} ({})", old.id, old.name);
                    }
                    EvictionPolicy::KeepBodies => {
                        info!("evicted snapshot {} from index, body kept", old.id);
                    }
                }
            }
        }
        self.write_index(&index)?;
        info!("created snapshot {} '{}'", snap.id, snap.name);
        Ok(snap)
    }

    pub fn create_snapshot(&self, name: &str, state: &AppState) -> Option<Snapshot> {
        match self.try_create(name, state) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("create snapshot failed: {}", e);
                None
            }
        }
    }

    /// Every indexed snapshot whose body is present and readable, newest
    /// first.
    pub fn list_snapshots(&self) -> Vec<Snapshot> {
        self.index()
            .iter()
            .filter_map(|entry| match self.try_load(&entry.id) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("skipping snapshot {}: {}", entry.id, e);
                    None
                }
            })
            .collect()
    }

    pub fn try_load(&self, id: &str) -> Result<Snapshot> {
        self.kv
            .get_json::<Snapshot>(&keys::snapshot(id))?
            .ok_or_else(|| StoreError::not_found(format!("snapshot {}", id)))
    }

    pub fn load_snapshot_by_id(&self, id: &str) -> Option<Snapshot> {
        match self.try_load(id) {
            Ok(s) => Some(s),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!("load snapshot {} failed: {}", id, e);
                None
            }
        }
    }

    pub fn try_delete(&self, id: &str) -> Result<()> {
        self.kv.try_remove(&keys::snapshot(id))?;
        let index = self.try_index()?;
        if index.iter().any(|e| e.id == id) {
            let kept: Vec<SnapshotEntry> = index.into_iter().filter(|e| e.id != id).collect();
            self.write_index(&kept)?;
        }
        Ok(())
    }

    pub fn delete_snapshot_by_id(&self, id: &str) {
        if let Err(e) = self.try_delete(id) {
            warn!("delete snapshot {} failed: {}", id, e);
        }
    }

    /// Index entries whose body is gone.
    pub fn dangling_entries(&self) -> Vec<SnapshotEntry> {
        self.index()
            .into_iter()
            .filter(|e| self.kv.get(&keys::snapshot(&e.id)).is_none())
            .collect()
    }

    /// Bodies that no index entry points at.
    pub fn orphaned_bodies(&self) -> Vec<String> {
        let index = self.index();
        self.kv
            .keys_with_prefix(keys::SNAPSHOT_PREFIX)
            .into_iter()
            .filter_map(|k| k.strip_prefix(keys::SNAPSHOT_PREFIX).map(str::to_string))
            .filter(|id| !index.iter().any(|e| &e.id == id))
            .collect()
    }
}
