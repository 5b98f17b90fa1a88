// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

use crate::kv::BackendKind;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "PocketVault", "pocketvault"));

pub const HOME_ENV: &str = "POCKETVAULT_HOME";
pub const DISABLE_ENV: &str = "POCKETVAULT_DISABLE";
pub const KEEP_ORPHANS_ENV: &str = "POCKETVAULT_KEEP_ORPHANS";

/// What happens to snapshot bodies whose index entries fall off the end of
/// the bounded index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Leave evicted bodies in the store (they become unreachable).
    KeepBodies,
    #[default]
    DeleteBodies,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// App-private root: SQLite database, file-backed KV, sandbox snapshots.
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// User-visible documents folder; `None` when the platform has none.
    pub document_dir: Option<PathBuf>,
    pub eviction: EvictionPolicy,
    pub disabled_backends: Vec<BackendKind>,
}

impl Config {
    /// Everything rooted under one directory. Used by tests and by
    /// `POCKETVAULT_HOME`.
    pub fn rooted(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            data_dir: root.join("data"),
            cache_dir: root.join("cache"),
            document_dir: Some(root.join("documents")),
            eviction: EvictionPolicy::default(),
            disabled_backends: Vec::new(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = match std::env::var_os(HOME_ENV) {
            Some(home) => Self::rooted(PathBuf::from(home)),
            None => Self::platform_default()?,
        };
        if let Ok(list) = std::env::var(DISABLE_ENV) {
            cfg.disabled_backends = parse_backend_list(&list);
        }
        if std::env::var_os(KEEP_ORPHANS_ENV).is_some() {
            cfg.eviction = EvictionPolicy::KeepBodies;
        }
        Ok(cfg)
    }

    fn platform_default() -> Result<Self> {
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
            .context("Could not determine platform-specific data dir")?;
        let document_dir = UserDirs::new()
            .and_then(|u| u.document_dir().map(|d| d.join(APP.1)));
        Ok(Self {
            data_dir: proj.data_dir().to_path_buf(),
            cache_dir: proj.cache_dir().to_path_buf(),
            document_dir,
            eviction: EvictionPolicy::default(),
            disabled_backends: Vec::new(),
        })
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn without(mut self, kind: BackendKind) -> Self {
        if !self.disabled_backends.contains(&kind) {
            self.disabled_backends.push(kind);
        }
        self
    }

    pub fn is_disabled(&self, kind: BackendKind) -> bool {
        self.disabled_backends.contains(&kind)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("pocketvault.sqlite")
    }

    pub fn kv_dir(&self) -> PathBuf {
        self.data_dir.join("kv")
    }

    pub fn sandbox_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }
}

fn parse_backend_list(s: &str) -> Vec<BackendKind> {
    s.split(',')
        .filter_map(|part| BackendKind::from_str(part.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_layout() {
        let cfg = Config::rooted("/tmp/pv");
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/pv/data/pocketvault.sqlite"));
        assert_eq!(cfg.kv_dir(), PathBuf::from("/tmp/pv/data/kv"));
        assert_eq!(cfg.sandbox_dir(), PathBuf::from("/tmp/pv/data/snapshots"));
        assert_eq!(cfg.eviction, EvictionPolicy::DeleteBodies);
    }

    #[test]
    fn backend_list_ignores_unknown_names() {
        let kinds = parse_backend_list("sqlite, bogus ,file");
        assert_eq!(kinds, vec![BackendKind::AsyncStore, BackendKind::FileStore]);
    }

    #[test]
    fn without_is_idempotent() {
        let cfg = Config::rooted("/tmp/pv")
            .without(BackendKind::FileStore)
            .without(BackendKind::FileStore);
        assert_eq!(cfg.disabled_backends.len(), 1);
        assert!(cfg.is_disabled(BackendKind::FileStore));
    }
}
