// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Backend, BackendKind};
use crate::error::{Result, StoreError};

/// `window.localStorage`, when running in a browser.
pub struct BrowserStore {
    storage: web_sys::Storage,
}

impl BrowserStore {
    pub fn detect() -> Option<Self> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
    }
}

fn js_err(op: &str, e: wasm_bindgen::JsValue) -> StoreError {
    StoreError::io(format!("localStorage {} failed: {:?}", op, e))
}

impl Backend for BrowserStore {
    fn kind(&self) -> BackendKind {
        BackendKind::BrowserStore
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(|e| js_err("get", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(|e| js_err("set", e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(|e| js_err("remove", e))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let len = self.storage.length().map_err(|e| js_err("length", e))?;
        let mut out = Vec::new();
        for i in 0..len {
            if let Some(k) = self.storage.key(i).map_err(|e| js_err("key", e))? {
                out.push(k);
            }
        }
        Ok(out)
    }
}
