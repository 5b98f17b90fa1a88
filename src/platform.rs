// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! OS affordances the file snapshot store leans on: a directory grant, a
//! share sheet and a document picker. `Ok(None)` from a prompt means the user
//! cancelled.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

pub trait Platform {
    fn request_directory(&self) -> Result<Option<PathBuf>>;
    fn share_file(&self, path: &Path) -> Result<()>;
    fn pick_document(&self) -> Result<Option<PathBuf>>;
}

/// Terminal stand-in: the "prompts" are answered up front from command-line
/// arguments, and sharing copies the file into an outbox directory.
#[derive(Debug, Clone, Default)]
pub struct CliPlatform {
    pub directory: Option<PathBuf>,
    pub document: Option<PathBuf>,
    pub outbox: Option<PathBuf>,
}

impl CliPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.document = Some(path.into());
        self
    }

    pub fn with_outbox(mut self, dir: impl Into<PathBuf>) -> Self {
        self.outbox = Some(dir.into());
        self
    }
}

impl Platform for CliPlatform {
    fn request_directory(&self) -> Result<Option<PathBuf>> {
        Ok(self.directory.clone())
    }

    fn share_file(&self, path: &Path) -> Result<()> {
        let Some(outbox) = &self.outbox else {
            info!("share: {}", path.display());
            return Ok(());
        };
        let name = path
            .file_name()
            .ok_or_else(|| StoreError::io(format!("no file name in {}", path.display())))?;
        fs::create_dir_all(outbox)?;
        fs::copy(path, outbox.join(name))?;
        info!("shared {} to {}", path.display(), outbox.display());
        Ok(())
    }

    fn pick_document(&self) -> Result<Option<PathBuf>> {
        Ok(self.document.clone())
    }
}
