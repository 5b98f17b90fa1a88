// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Key-value store over layered backends.
//!
//! `KvStore` owns the backends chosen by [`probe::BackendProbe`] in priority
//! order (browser local store, SQLite, files, memory). Each call walks that
//! list and falls through to the next backend when one errors; memory is
//! always last and never fails, so the sentinel API (`get`/`set`/`remove`)
//! cannot fail. Values are UTF-8 text; callers JSON-encode structured data.

pub mod file;
pub mod memory;
pub mod probe;

#[cfg(target_arch = "wasm32")]
pub mod browser;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Result, StoreError};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use probe::{BackendProbe, ProbeEntry, ProbeReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BackendKind {
    BrowserStore,
    /// SQLite database file standing in for the native async key-value store
    AsyncStore,
    FileStore,
    MemoryStore,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::BrowserStore,
        BackendKind::AsyncStore,
        BackendKind::FileStore,
        BackendKind::MemoryStore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::BrowserStore => "browser",
            BackendKind::AsyncStore => "sqlite",
            BackendKind::FileStore => "file",
            BackendKind::MemoryStore => "memory",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "browser" | "local" | "localstorage" => Some(BackendKind::BrowserStore),
            "sqlite" | "async" | "db" => Some(BackendKind::AsyncStore),
            "file" | "files" | "fs" => Some(BackendKind::FileStore),
            "memory" | "mem" | "ram" => Some(BackendKind::MemoryStore),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storage backend. Implementations report failures; `KvStore` decides
/// whether to fall through.
pub trait Backend {
    fn kind(&self) -> BackendKind;
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Key enumeration, used only for diagnostics.
    fn keys(&self) -> Result<Vec<String>> {
        Err(StoreError::unavailable(format!(
            "{} backend cannot enumerate keys",
            self.kind()
        )))
    }
}

pub struct KvStore {
    backends: Vec<Box<dyn Backend>>,
    report: ProbeReport,
}

impl KvStore {
    /// Probe once and keep the result for the lifetime of the store.
    pub fn open(cfg: &Config) -> Self {
        let (backends, report) = BackendProbe::new(cfg).run();
        debug!("kv backends: {}", report.summary());
        Self { backends, report }
    }

    pub fn in_memory() -> Self {
        Self::with_backends(Vec::new())
    }

    /// Inject an explicit backend chain. A memory backend is appended when the
    /// chain does not already end in one.
    pub fn with_backends(mut backends: Vec<Box<dyn Backend>>) -> Self {
        if backends.last().map(|b| b.kind()) != Some(BackendKind::MemoryStore) {
            backends.push(Box::new(MemoryStore::new()));
        }
        let report = ProbeReport::from_chain(&backends);
        Self { backends, report }
    }

    pub fn report(&self) -> &ProbeReport {
        &self.report
    }

    /// The preferred backend: first in the chain.
    pub fn active(&self) -> BackendKind {
        self.backends
            .first()
            .map(|b| b.kind())
            .unwrap_or(BackendKind::MemoryStore)
    }

    pub fn chain(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    fn walk<T>(&self, op: &str, key: &str, f: impl Fn(&dyn Backend) -> Result<T>) -> Result<T> {
        let mut last_err = None;
        for backend in &self.backends {
            match f(backend.as_ref()) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    debug!("kv {} '{}' failed on {}: {}", op, key, backend.kind(), e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| StoreError::unavailable("no storage backend")))
    }

    pub fn try_get(&self, key: &str) -> Result<Option<String>> {
        self.walk("get", key, |b| b.get(key))
    }

    pub fn try_set(&self, key: &str, value: &str) -> Result<()> {
        self.walk("set", key, |b| b.set(key, value))
    }

    pub fn try_remove(&self, key: &str) -> Result<()> {
        self.walk("remove", key, |b| b.remove(key))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.try_get(key).unwrap_or_else(|e| {
            warn!("kv get '{}' failed: {}", key, e);
            None
        })
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            warn!("kv set '{}' failed: {}", key, e);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            warn!("kv remove '{}' failed: {}", key, e);
        }
    }

    /// Read and decode a JSON value. `Ok(None)` means the key is absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.try_get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.try_set(key, &raw)
    }

    /// Keys starting with `prefix`, merged across every backend that can
    /// enumerate.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for backend in &self.backends {
            match backend.keys() {
                Ok(keys) => {
                    for k in keys {
                        if k.starts_with(prefix) && !out.contains(&k) {
                            out.push(k);
                        }
                    }
                }
                Err(e) => debug!("kv keys skipped {}: {}", backend.kind(), e),
            }
        }
        out.sort();
        out
    }
}
