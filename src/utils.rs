//! Utility functions for text truncation, page titles and file output.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe truncation for display text and log previews
//! - Default page title generation
//! - JSON file output for fetched results

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended. Cuts on a character boundary, so
/// Hangul text is safe.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Keep at most `max` characters of `s`.
///
/// Returns the kept prefix and whether anything was cut off.
pub fn truncate_chars(s: &str, max: usize) -> (&str, bool) {
    match s.char_indices().nth(max) {
        None => (s, false),
        Some((cut, _)) => (&s[..cut], true),
    }
}

/// Title used for a digest page when the caller does not supply one.
pub fn default_page_title(date: NaiveDate) -> String {
    format!("뉴스 요약 – {}", date.format("%Y-%m-%d"))
}

/// Today's date in the local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Serialize `value` as pretty JSON and write it to `path`, creating parent
/// directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_json_file<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON output");
    Ok(())
}
