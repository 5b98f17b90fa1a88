// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use log::{debug, warn};
use once_cell::sync::OnceCell;
use std::fs;
use std::io::ErrorKind as IoKind;
use std::path::{Path, PathBuf};

use super::{Backend, BackendKind};
use crate::error::{Result, StoreError};

const EXT: &str = ".kv";

/// One file per key under a dedicated directory. File names are the
/// percent-encoded key plus `.kv`.
///
/// The directory is created and checked on first use. If that fails the
/// backend stays unavailable for the rest of the session and every call
/// errors, letting `KvStore` fall through to memory.
pub struct FileStore {
    dir: PathBuf,
    ready: OnceCell<std::result::Result<(), String>>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ready: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<&Path> {
        let state = self.ready.get_or_init(|| {
            let res = fs::create_dir_all(&self.dir)
                .map_err(|e| e.to_string())
                .and_then(|_| match fs::metadata(&self.dir) {
                    Ok(m) if m.is_dir() => Ok(()),
                    Ok(_) => Err("path exists but is not a directory".to_string()),
                    Err(e) => Err(e.to_string()),
                });
            match &res {
                Ok(()) => debug!("file kv ready at {}", self.dir.display()),
                Err(e) => warn!(
                    "file kv disabled for this session ({}): {}",
                    self.dir.display(),
                    e
                ),
            }
            res
        });
        match state {
            Ok(()) => Ok(&self.dir),
            Err(e) => Err(StoreError::unavailable(format!(
                "kv directory {} unusable: {}",
                self.dir.display(),
                e
            ))),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let dir = self.ensure_dir()?;
        Ok(dir.join(file_name_for(key)))
    }
}

pub fn file_name_for(key: &str) -> String {
    format!("{}{}", urlencoding::encode(key), EXT)
}

pub fn key_for(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(EXT)?;
    urlencoding::decode(stem).ok().map(|k| k.into_owned())
}

impl Backend for FileStore {
    fn kind(&self) -> BackendKind {
        BackendKind::FileStore
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == IoKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let dir = self.ensure_dir()?;
        let mut out = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if let Some(key) = entry.file_name().to_str().and_then(key_for) {
                out.push(key);
            }
        }
        Ok(out)
    }
}
