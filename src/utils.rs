// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

const UA: &str = concat!("pocketvault/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// `YYYY-MM-DDTHH:MM:SS`, the second-precision prefix of an ISO timestamp.
pub fn iso19(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Rebuild a UTC timestamp from an ISO prefix or a full RFC 3339 string.
/// Empty or unreadable input means "now".
pub fn parse_iso(s: &str) -> DateTime<Utc> {
    let s = s.trim();
    if s.is_empty() {
        return Utc::now();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    let head = truncate_chars(s, 19);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&head, "%Y-%m-%dT%H:%M:%S") {
        return naive.and_utc();
    }
    if let Ok(day) = NaiveDate::parse_from_str(&truncate_chars(s, 10), "%Y-%m-%d") {
        if let Some(naive) = day.and_hms_opt(0, 0, 0) {
            return naive.and_utc();
        }
    }
    Utc::now()
}

static UNSAFE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}_-]+").expect("static regex"));

/// Reduce a display name to something safe inside a file name.
pub fn sanitize_file_stem(name: &str, max: usize) -> String {
    let cleaned = UNSAFE_NAME.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    let out = truncate_chars(cleaned, max);
    if out.is_empty() {
        "snapshot".to_string()
    } else {
        out
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("Maaş ödemesi", 4), "Maaş");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn iso_prefix_round_trip() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(iso19(&at), "2025-01-15T10:00:00");
        assert_eq!(parse_iso("2025-01-15T10:00:00"), at);
        assert_eq!(parse_iso("2025-01-15T10:00:00.000Z"), at);
        assert_eq!(
            parse_iso("2025-01-15"),
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_timestamp_means_now() {
        let before = Utc::now();
        let got = parse_iso("");
        assert!(got >= before);
        assert!(parse_iso("garbage") >= before);
    }

    #[test]
    fn file_stems_are_sanitized() {
        assert_eq!(sanitize_file_stem("Dubai trip / 2025", 40), "Dubai_trip_2025");
        assert_eq!(sanitize_file_stem("  ", 40), "snapshot");
        assert_eq!(sanitize_file_stem("İstanbul", 40), "İstanbul");
        assert_eq!(sanitize_file_stem("abcdef", 3), "abc");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
        assert_eq!(new_id().len(), 32);
    }
}
