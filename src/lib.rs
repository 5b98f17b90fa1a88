// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod keys;
pub mod kv;
pub mod ledger;
pub mod models;
pub mod platform;
pub mod snapshots;
pub mod state;
pub mod utils;
