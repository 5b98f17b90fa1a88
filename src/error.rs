// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the storage subsystem.
//!
//! Every public entry point of the storage layer swallows these and returns a
//! sentinel instead; the `try_*` variants hand them to callers that want to
//! tell "not found" apart from "backend failure" or "parse failure".

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A backend could not be reached or lacks a required capability
    BackendUnavailable,
    /// Read/write/delete against an available backend failed
    Io,
    /// Stored or supplied text is not JSON, or not the expected shape
    Parse,
    NotFound,
    /// Business-level input rejected (amounts, dates)
    Validation,
    /// The user dismissed a platform prompt
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::Io => "io",
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct StoreError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BackendUnavailable, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, format!("Not found: {}", what.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::io(format!("I/O error: {}", err)).with_source(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::io(format!("SQLite error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::parse(format!("JSON error: {}", err)).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_includes_kind_tag() {
        let err = StoreError::io("disk full");
        assert_eq!(format!("{}", err), "[io] disk full");

        let err = StoreError::not_found("pocketvault:state");
        let msg = err.to_string();
        assert!(msg.starts_with("[not_found]"));
        assert!(msg.contains("pocketvault:state"));
        assert!(err.is_not_found());
    }

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(ErrorKind::BackendUnavailable.as_str(), "backend_unavailable");
        assert_eq!(ErrorKind::Io.as_str(), "io");
        assert_eq!(ErrorKind::Parse.as_str(), "parse");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Validation.as_str(), "validation");
        assert_eq!(ErrorKind::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn json_errors_map_to_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json")
            .err()
            .unwrap();
        let err: StoreError = json_err.into();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.source().is_some());
    }

    #[test]
    fn io_errors_keep_their_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StoreError = io_err.into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.source().unwrap().to_string().contains("read-only"));
    }

    #[test]
    fn sqlite_errors_map_to_io() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.message.contains("SQLite error"));
    }
}
