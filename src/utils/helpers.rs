//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use crate::utils::errors::{PageDropError, Result};

/// Root prefix for all hosted uploads
pub const UPLOADS_PREFIX: &str = "uploads/";

/// Content type used for hosted HTML pages
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// UTC calendar day key used by the daily usage tracker
pub fn utc_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Parse a chat identity typed by an admin
pub fn parse_user_id(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let candidate = trimmed.strip_prefix("tg://user?id=").unwrap_or(trimmed);

    candidate
        .parse::<i64>()
        .map_err(|_| PageDropError::InvalidInput(format!("'{}' is not a valid user ID. Send a numeric chat ID.", trimmed)))
}

/// Parse a strictly positive slot count typed by an admin
pub fn parse_positive_count(text: &str) -> Result<u32> {
    match text.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(PageDropError::InvalidInput(format!(
            "'{}' is not a valid number. Send a positive whole number.",
            text.trim()
        ))),
    }
}

/// Parse the `/start` payload into a referrer ID, if it is one
pub fn parse_referral_payload(payload: &str) -> Option<i64> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok().filter(|id| *id > 0)
}

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^/\\\x00-\x1f]{1,200}$").expect("file name pattern is valid")
    })
}

/// Check that an uploaded file can be hosted and return its normalized name
pub fn validate_file_name(file_name: &str) -> Result<String> {
    let name = file_name.trim();

    if !file_name_pattern().is_match(name) || name == "." || name == ".." {
        return Err(PageDropError::InvalidInput(format!("'{}' is not a valid file name.", name)));
    }

    if !is_supported_file(name) {
        return Err(PageDropError::InvalidInput("Please upload an HTML or ZIP file.".to_string()));
    }

    Ok(name.to_string())
}

/// Only HTML pages and ZIP bundles are hosted
pub fn is_supported_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".html") || lower.ends_with(".zip")
}

/// Pick the content type stored alongside the object
pub fn content_type_for(file_name: &str, reported_mime: Option<&str>) -> String {
    if file_name.to_lowercase().ends_with(".html") {
        HTML_CONTENT_TYPE.to_string()
    } else {
        reported_mime
            .filter(|mime| !mime.is_empty())
            .unwrap_or("application/zip")
            .to_string()
    }
}

/// Storage path prefix holding one user's uploads
pub fn user_prefix(user_id: i64) -> String {
    format!("{}{}/", UPLOADS_PREFIX, user_id)
}

/// Storage path of a user's file
pub fn object_path(user_id: i64, file_name: &str) -> String {
    format!("{}{}", user_prefix(user_id), file_name)
}

/// Display name of a stored object (path without the user prefix)
pub fn display_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Deep link that starts the bot with a referral payload
pub fn referral_link(bot_username: &str, user_id: i64) -> String {
    format!("https://t.me/{}?start={}", bot_username.trim_start_matches('@'), user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    #[test]
    fn test_utc_day_uses_utc_calendar() {
        let late = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        assert_eq!(utc_day(late), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id(" 12345 ").unwrap(), 12345);
        assert_eq!(parse_user_id("tg://user?id=77").unwrap(), 77);
        assert_matches!(parse_user_id("bob"), Err(PageDropError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_positive_count() {
        assert_eq!(parse_positive_count("5").unwrap(), 5);
        assert!(parse_positive_count("0").is_err());
        assert!(parse_positive_count("-3").is_err());
        assert!(parse_positive_count("five").is_err());
    }

    #[test]
    fn test_parse_referral_payload() {
        assert_eq!(parse_referral_payload("4242"), Some(4242));
        assert_eq!(parse_referral_payload(""), None);
        assert_eq!(parse_referral_payload("promo"), None);
        assert_eq!(parse_referral_payload("-5"), None);
    }

    #[test]
    fn test_validate_file_name() {
        assert_eq!(validate_file_name("site.html").unwrap(), "site.html");
        assert_eq!(validate_file_name("Bundle.ZIP").unwrap(), "Bundle.ZIP");
        assert!(validate_file_name("notes.txt").is_err());
        assert!(validate_file_name("../other/site.html").is_err());
        assert!(validate_file_name("a\\b.html").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("index.html", Some("application/octet-stream")), HTML_CONTENT_TYPE);
        assert_eq!(content_type_for("site.zip", Some("application/x-zip-compressed")), "application/x-zip-compressed");
        assert_eq!(content_type_for("site.zip", None), "application/zip");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>a & b</b>"), "&lt;b&gt;a &amp; b&lt;/b&gt;");
    }

    #[test]
    fn test_paths() {
        assert_eq!(object_path(7, "a.html"), "uploads/7/a.html");
        assert_eq!(display_name("uploads/7/a.html"), "a.html");
        assert_eq!(referral_link("@drop_bot", 7), "https://t.me/drop_bot?start=7");
    }
}
