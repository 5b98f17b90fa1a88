// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fixed key space inside the shared KV namespace. Every writer goes through
//! these constants.

pub const STATE: &str = "pocketvault:state";
pub const SNAPSHOT_INDEX: &str = "pocketvault:snapshots";
pub const SNAPSHOT_PREFIX: &str = "pocketvault:snapshot:";
pub const USER_DIR: &str = "pocketvault:saf-dir";
pub const FILE_SNAPSHOT_INDEX: &str = "pocketvault:file-snapshots";

pub fn snapshot(id: &str) -> String {
    format!("{}{}", SNAPSHOT_PREFIX, id)
}
