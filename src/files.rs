// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Snapshots as standalone JSON files.
//!
//! Ids carry the storage kind as a prefix and the prefix decides how the id
//! is read or deleted:
//!
//! - `share:<path>` written to the cache directory for the share sheet
//! - `file:<path>` written to the document or sandbox directory
//! - `saf:<path>` written to the user-granted directory; also recorded in the
//!   file-snapshot index since that directory is not scanned
//!
//! The operations without a `try_` prefix return `None` or do nothing on
//! failure and log why.

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind as IoKind;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::kv::KvStore;
use crate::models::AppState;
use crate::platform::Platform;
use crate::snapshots::{NAME_MAX, Snapshot, SnapshotEntry, parse_index};
use crate::utils::sanitize_file_stem;

pub const FILE_LIST_CAP: usize = 80;

static FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pocketvault-(\d{10,})-(.*)\.json$").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileLocation {
    Share,
    File,
    UserDir,
}

impl FileLocation {
    pub fn prefix(&self) -> &'static str {
        match self {
            FileLocation::Share => "share:",
            FileLocation::File => "file:",
            FileLocation::UserDir => "saf:",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileLocation::Share => "share",
            FileLocation::File => "file",
            FileLocation::UserDir => "saf",
        }
    }

    pub fn id_for(&self, path: &Path) -> String {
        format!("{}{}", self.prefix(), path.display())
    }
}

/// Split a prefixed id into its location and path.
pub fn parse_file_id(id: &str) -> Option<(FileLocation, PathBuf)> {
    let (kind, rest) = id.split_once(':')?;
    if rest.is_empty() {
        return None;
    }
    let loc = match kind {
        "share" => FileLocation::Share,
        "file" => FileLocation::File,
        "saf" => FileLocation::UserDir,
        _ => return None,
    };
    Some((loc, PathBuf::from(rest)))
}

pub fn file_name_for(snap: &Snapshot) -> String {
    format!(
        "pocketvault-{}-{}.json",
        snap.at.timestamp_millis(),
        sanitize_file_stem(&snap.name, NAME_MAX)
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSnapshotInfo {
    pub id: String,
    pub name: String,
    pub at: DateTime<Utc>,
    pub location: FileLocation,
}

/// Interpret a picked or stored JSON document as a snapshot. Anything the
/// backup decoder accepts is wrapped under `fallback_name`.
pub fn snapshot_from_value(v: Value, fallback_name: &str) -> Option<Snapshot> {
    if let Ok(snap) = serde_json::from_value::<Snapshot>(v.clone()) {
        return Some(snap);
    }
    let name = v
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(fallback_name)
        .to_string();
    let state = backup::unpack(&v)?;
    Some(Snapshot::from_document(&name, state))
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == IoKind::NotFound => {
            return Err(StoreError::not_found(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let v: Value = serde_json::from_str(&raw)?;
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("imported");
    snapshot_from_value(v, fallback)
        .ok_or_else(|| StoreError::parse(format!("{} is not a snapshot", path.display())))
}

fn write_into(dir: &Path, snap: &Snapshot) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name_for(snap));
    fs::write(&path, serde_json::to_string_pretty(snap)?)?;
    Ok(path)
}

/// Listing entry for a file we did not necessarily write: prefer the encoded
/// timestamp, fall back to modification time.
fn describe(path: &Path, location: FileLocation) -> Option<FileSnapshotInfo> {
    let file_name = path.file_name()?.to_str()?;
    if !file_name.ends_with(".json") {
        return None;
    }
    if let Some(caps) = FILE_NAME.captures(file_name) {
        let millis: i64 = caps[1].parse().ok()?;
        let at = Utc.timestamp_millis_opt(millis).single()?;
        return Some(FileSnapshotInfo {
            id: location.id_for(path),
            name: caps[2].replace('_', " "),
            at,
            location,
        });
    }
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(FileSnapshotInfo {
        id: location.id_for(path),
        name: path.file_stem()?.to_string_lossy().to_string(),
        at: DateTime::<Utc>::from(modified),
        location,
    })
}

pub struct FileSnapshotStore<'a> {
    kv: &'a KvStore,
    cfg: &'a Config,
    platform: &'a dyn Platform,
}

impl<'a> FileSnapshotStore<'a> {
    pub fn new(kv: &'a KvStore, cfg: &'a Config, platform: &'a dyn Platform) -> Self {
        Self { kv, cfg, platform }
    }

    /// Write targets in preference order.
    pub fn candidates(&self) -> Vec<(FileLocation, PathBuf)> {
        let mut out = vec![(FileLocation::Share, self.cfg.cache_dir.join("snapshots"))];
        if let Some(doc) = &self.cfg.document_dir {
            out.push((FileLocation::File, doc.clone()));
        }
        out.push((FileLocation::File, self.cfg.sandbox_dir()));
        out
    }

    pub fn try_save_to_file(&self, name: &str, state: &AppState) -> Result<String> {
        let snap = Snapshot::new(name, state);
        let mut last_err = None;
        for (location, dir) in self.candidates() {
            match write_into(&dir, &snap) {
                Ok(path) => {
                    if let Err(e) = self.platform.share_file(&path) {
                        warn!("share failed, file kept at {}: {}", path.display(), e);
                    }
                    info!("snapshot file written to {}", path.display());
                    return Ok(location.id_for(&path));
                }
                Err(e) => {
                    debug!("cannot write snapshot into {}: {}", dir.display(), e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| StoreError::unavailable("no writable snapshot directory")))
    }

    pub fn save_snapshot_to_file(&self, name: &str, state: &AppState) -> Option<String> {
        match self.try_save_to_file(name, state) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("could not write snapshot file: {}", e);
                None
            }
        }
    }

    /// The user-granted directory, asking the platform only when nothing is
    /// cached or a re-pick is forced.
    pub fn try_choose_directory(&self, force_repick: bool) -> Result<PathBuf> {
        if !force_repick {
            if let Some(dir) = self.kv.try_get(keys::USER_DIR)? {
                return Ok(PathBuf::from(dir));
            }
        }
        let dir = self
            .platform
            .request_directory()?
            .ok_or_else(|| StoreError::cancelled("directory grant dismissed"))?;
        self.kv.try_set(keys::USER_DIR, &dir.to_string_lossy())?;
        Ok(dir)
    }

    pub fn choose_directory(&self, force_repick: bool) -> Option<PathBuf> {
        match self.try_choose_directory(force_repick) {
            Ok(dir) => Some(dir),
            Err(e) => {
                info!("no user directory: {}", e);
                None
            }
        }
    }

    fn try_file_index(&self) -> Result<Vec<SnapshotEntry>> {
        match self.kv.try_get(keys::FILE_SNAPSHOT_INDEX)? {
            Some(raw) => parse_index(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn file_index(&self) -> Vec<SnapshotEntry> {
        self.try_file_index().unwrap_or_else(|e| {
            warn!("file snapshot index unreadable: {}", e);
            Vec::new()
        })
    }

    pub fn try_save_to_user_dir(
        &self,
        name: &str,
        state: &AppState,
        force_repick: bool,
    ) -> Result<String> {
        let dir = self.try_choose_directory(force_repick)?;
        let mut index = self.try_file_index()?;
        let snap = Snapshot::new(name, state);
        let path = write_into(&dir, &snap)?;
        let id = FileLocation::UserDir.id_for(&path);

        index.insert(
            0,
            SnapshotEntry {
                id: id.clone(),
                ..snap.entry()
            },
        );
        index.truncate(FILE_LIST_CAP);
        self.kv.set_json(keys::FILE_SNAPSHOT_INDEX, &index)?;
        Ok(id)
    }

    pub fn save_snapshot_to_user_dir(
        &self,
        name: &str,
        state: &AppState,
        force_repick: bool,
    ) -> Option<String> {
        match self.try_save_to_user_dir(name, state, force_repick) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("could not write snapshot to user directory: {}", e);
                None
            }
        }
    }

    /// `saf:` index entries merged with the app-private directories, newest
    /// first, at most [`FILE_LIST_CAP`].
    pub fn list_file_snapshots(&self) -> Vec<FileSnapshotInfo> {
        let mut out: Vec<FileSnapshotInfo> = Vec::new();
        let mut listed: HashSet<PathBuf> = HashSet::new();
        for e in self.file_index() {
            if let Some((_, path)) = parse_file_id(&e.id) {
                if !listed.insert(path) {
                    continue;
                }
            }
            out.push(FileSnapshotInfo {
                id: e.id,
                name: e.name,
                at: e.at,
                location: FileLocation::UserDir,
            });
        }

        let mut scanned: Vec<PathBuf> = Vec::new();
        for (location, dir) in self.candidates() {
            if scanned.contains(&dir) {
                continue;
            }
            scanned.push(dir.clone());
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("skip listing {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if listed.contains(&path) {
                    continue;
                }
                if let Some(info) = describe(&path, location) {
                    listed.insert(path);
                    out.push(info);
                }
            }
        }

        out.sort_by(|a, b| b.at.cmp(&a.at));
        out.truncate(FILE_LIST_CAP);
        out
    }

    pub fn try_load(&self, id: &str) -> Result<Snapshot> {
        let (_, path) = parse_file_id(id)
            .ok_or_else(|| StoreError::parse(format!("unrecognised file snapshot id '{}'", id)))?;
        read_snapshot(&path)
    }

    pub fn load_file_snapshot_by_id(&self, id: &str) -> Option<Snapshot> {
        match self.try_load(id) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("could not read snapshot file {}: {}", id, e);
                None
            }
        }
    }

    /// True when `path` is a `.json` file directly inside one of the
    /// app-private directories for `location`.
    fn owns(&self, location: FileLocation, path: &Path) -> bool {
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        is_json
            && path.parent().is_some_and(|parent| {
                self.candidates()
                    .iter()
                    .any(|(loc, dir)| *loc == location && dir.as_path() == parent)
            })
    }

    /// Remove a listed snapshot file. `saf:` ids must be in the index and
    /// other ids must point into an app-private directory; nothing else is
    /// touched. A file that is already gone is not an error.
    pub fn try_delete(&self, id: &str) -> Result<()> {
        let (location, path) = parse_file_id(id)
            .ok_or_else(|| StoreError::parse(format!("unrecognised file snapshot id '{}'", id)))?;
        let kept = match location {
            FileLocation::UserDir => {
                let index = self.try_file_index()?;
                if !index.iter().any(|e| e.id == id) {
                    return Err(StoreError::not_found(format!("{} is not indexed", id)));
                }
                Some(index.into_iter().filter(|e| e.id != id).collect::<Vec<_>>())
            }
            FileLocation::Share | FileLocation::File => {
                if !self.owns(location, &path) {
                    return Err(StoreError::validation(format!(
                        "{} is outside the snapshot directories",
                        path.display()
                    )));
                }
                None
            }
        };
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == IoKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(kept) = kept {
            self.kv.set_json(keys::FILE_SNAPSHOT_INDEX, &kept)?;
        }
        info!("deleted snapshot file {}", id);
        Ok(())
    }

    pub fn delete_file_snapshot_by_id(&self, id: &str) {
        if let Err(e) = self.try_delete(id) {
            warn!("could not delete snapshot file {}: {}", id, e);
        }
    }

    pub fn try_pick(&self) -> Result<Snapshot> {
        let path = self
            .platform
            .pick_document()?
            .ok_or_else(|| StoreError::cancelled("document picker dismissed"))?;
        read_snapshot(&path)
    }

    /// `None` both when the picker is dismissed and when the file is not
    /// usable.
    pub fn pick_snapshot_from_device(&self) -> Option<Snapshot> {
        match self.try_pick() {
            Ok(s) => Some(s),
            Err(e) if e.kind == crate::error::ErrorKind::Cancelled => None,
            Err(e) => {
                warn!("picked file unusable: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_dispatch_on_prefix() {
        let (loc, path) = parse_file_id("saf:/sd/PocketVault/a.json").unwrap();
        assert_eq!(loc, FileLocation::UserDir);
        assert_eq!(path, PathBuf::from("/sd/PocketVault/a.json"));
        assert_eq!(parse_file_id("share:/c/x.json").unwrap().0, FileLocation::Share);
        assert_eq!(parse_file_id("file:C:\\x.json").unwrap().1, PathBuf::from("C:\\x.json"));
        assert!(parse_file_id("kv:/x").is_none());
        assert!(parse_file_id("file:").is_none());
        assert!(parse_file_id("plain").is_none());
    }

    #[test]
    fn file_names_encode_time_and_name() {
        let mut snap = Snapshot::from_document("Dubai trip", serde_json::json!({}));
        snap.at = Utc.timestamp_millis_opt(1_736_935_200_000).single().unwrap();
        let name = file_name_for(&snap);
        assert_eq!(name, "pocketvault-1736935200000-Dubai_trip.json");

        let info = describe(Path::new(&format!("/x/{}", name)), FileLocation::File).unwrap();
        assert_eq!(info.name, "Dubai trip");
        assert_eq!(info.at, snap.at);
        assert_eq!(info.id, format!("file:/x/{}", name));
    }
}
