// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use log::debug;
use serde::Serialize;
use std::fs;

use super::{Backend, BackendKind, FileStore, MemoryStore};
use crate::config::Config;
use crate::db::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct ProbeEntry {
    pub kind: BackendKind,
    pub available: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    pub entries: Vec<ProbeEntry>,
}

impl ProbeReport {
    pub(crate) fn from_chain(chain: &[Box<dyn Backend>]) -> Self {
        let entries = BackendKind::ALL
            .iter()
            .map(|kind| {
                let available = chain.iter().any(|b| b.kind() == *kind);
                ProbeEntry {
                    kind: *kind,
                    available,
                    detail: if available { "injected" } else { "not injected" }.to_string(),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn available(&self) -> Vec<BackendKind> {
        self.entries
            .iter()
            .filter(|e| e.available)
            .map(|e| e.kind)
            .collect()
    }

    pub fn is_available(&self, kind: BackendKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind && e.available)
    }

    pub fn summary(&self) -> String {
        self.available()
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

/// Decides which backends are usable. Never fails: a backend that cannot be
/// set up is recorded as absent and the next one is tried.
pub struct BackendProbe<'a> {
    cfg: &'a Config,
}

impl<'a> BackendProbe<'a> {
    pub fn new(cfg: &'a Config) -> Self {
        Self { cfg }
    }

    pub fn run(&self) -> (Vec<Box<dyn Backend>>, ProbeReport) {
        let mut chain: Vec<Box<dyn Backend>> = Vec::new();
        let mut report = ProbeReport::default();

        let mut record = |kind: BackendKind, found: Result<Box<dyn Backend>, String>| {
            let entry = match found {
                Ok(backend) => {
                    chain.push(backend);
                    ProbeEntry {
                        kind,
                        available: true,
                        detail: "ok".to_string(),
                    }
                }
                Err(detail) => {
                    debug!("probe: {} absent ({})", kind, detail);
                    ProbeEntry {
                        kind,
                        available: false,
                        detail,
                    }
                }
            };
            report.entries.push(entry);
        };

        record(BackendKind::BrowserStore, self.gate(BackendKind::BrowserStore, probe_browser));
        record(
            BackendKind::AsyncStore,
            self.gate(BackendKind::AsyncStore, || self.probe_sqlite()),
        );
        record(
            BackendKind::FileStore,
            self.gate(BackendKind::FileStore, || self.probe_files()),
        );
        record(
            BackendKind::MemoryStore,
            Ok(Box::new(MemoryStore::new()) as Box<dyn Backend>),
        );

        (chain, report)
    }

    fn gate(
        &self,
        kind: BackendKind,
        probe: impl FnOnce() -> Result<Box<dyn Backend>, String>,
    ) -> Result<Box<dyn Backend>, String> {
        if self.cfg.is_disabled(kind) {
            return Err("disabled by configuration".to_string());
        }
        probe()
    }

    fn probe_sqlite(&self) -> Result<Box<dyn Backend>, String> {
        SqliteStore::open(&self.cfg.db_path())
            .map(|s| Box::new(s) as Box<dyn Backend>)
            .map_err(|e| e.to_string())
    }

    /// The file backend needs a writable data directory. Its own `kv`
    /// subdirectory is created later, on first use.
    fn probe_files(&self) -> Result<Box<dyn Backend>, String> {
        fs::create_dir_all(&self.cfg.data_dir).map_err(|e| e.to_string())?;
        let meta = fs::metadata(&self.cfg.data_dir).map_err(|e| e.to_string())?;
        if meta.permissions().readonly() {
            return Err(format!("{} is read-only", self.cfg.data_dir.display()));
        }
        Ok(Box::new(FileStore::new(self.cfg.kv_dir())))
    }
}

#[cfg(target_arch = "wasm32")]
fn probe_browser() -> Result<Box<dyn Backend>, String> {
    super::browser::BrowserStore::detect()
        .map(|s| Box::new(s) as Box<dyn Backend>)
        .ok_or_else(|| "window.localStorage unavailable".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn probe_browser() -> Result<Box<dyn Backend>, String> {
    Err("not a browser environment".to_string())
}
