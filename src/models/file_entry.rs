//! Stored-file records returned by the storage backend, and the display
//! cards the listing view renders from them.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use uuid::Uuid;

/// One entry of a storage folder listing.
///
/// Folder placeholders come back without an `id` or metadata, so everything
/// beyond the name is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredFile {
    pub name: String,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<FileMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

/// Everything the listing view needs for one card.
#[derive(Debug, Clone)]
pub struct FileCard {
    pub id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub age: String,
    pub size: String,
    pub mime: Option<String>,
}

impl FileCard {
    pub fn from_entry(entry: &StoredFile, url: String, now: DateTime<Utc>) -> Self {
        let created = entry.created_at.or(entry.updated_at);
        Self {
            id: entry.id,
            title: display_title(&entry.name),
            url,
            age: format_age(created, now),
            size: format_size(entry.metadata.as_ref().and_then(|m| m.size)),
            mime: entry.metadata.as_ref().and_then(|m| m.mimetype.clone()),
        }
    }
}

static KEY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_\d+\.").expect("key prefix pattern"));
static PDF_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf$").expect("pdf suffix pattern"));
static BARE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_").expect("bare prefix pattern"));

/// Strip the synthetic `{identifier}_{timestamp}.` prefix and the `.pdf`
/// suffix from a storage key so the card shows a readable title.
pub fn display_title(name: &str) -> String {
    let title = KEY_PREFIX_RE.replace(name, "");
    let title = PDF_SUFFIX_RE.replace(&title, "");
    let title = BARE_PREFIX_RE.replace(&title, "").to_string();
    if title.is_empty() {
        "PDF file".to_string()
    } else {
        title
    }
}

/// Human-relative age of a file: "today", "yesterday", "N days ago" inside
/// a week, a calendar date beyond that.
pub fn format_age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created_at else {
        return "unknown".to_string();
    };
    let days = (now - created).num_days().abs();
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => created.format("%-d %b %Y").to_string(),
    }
}

/// File size in mebibytes with two decimals, or "unknown" when the backend
/// reported none.
pub fn format_size(size: Option<i64>) -> String {
    match size {
        Some(bytes) if bytes > 0 => {
            let mib = bytes as f64 / (1024.0 * 1024.0);
            format!("{mib:.2} MB")
        }
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_listing_entry_deserializes_from_provider_json() {
        let raw = r#"{
            "name": "12345_1754500000000.pdf",
            "id": "b4a8a1f2-3c63-4c3e-8f2a-0d7c2f1e9b5a",
            "updated_at": "2026-08-01T10:00:00.000Z",
            "created_at": "2026-08-01T10:00:00.000Z",
            "last_accessed_at": "2026-08-01T10:00:00.000Z",
            "metadata": { "size": 1048576, "mimetype": "application/pdf" }
        }"#;
        let entry: StoredFile = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.name, "12345_1754500000000.pdf");
        assert!(entry.id.is_some());
        assert_eq!(entry.metadata.as_ref().unwrap().size, Some(1_048_576));
    }

    #[test]
    fn test_folder_placeholder_deserializes_without_metadata() {
        let raw = r#"{ "name": "pdfs", "id": null, "metadata": null }"#;
        let entry: StoredFile = serde_json::from_str(raw).unwrap();
        assert!(entry.id.is_none());
        assert!(entry.metadata.is_none());
    }

    #[test]
    fn test_age_today() {
        let now = Utc::now();
        assert_eq!(format_age(Some(now), now), "today");
    }

    #[test]
    fn test_age_yesterday() {
        let now = Utc::now();
        assert_eq!(format_age(Some(now - Duration::days(1)), now), "yesterday");
    }

    #[test]
    fn test_age_within_a_week() {
        let now = Utc::now();
        assert_eq!(format_age(Some(now - Duration::days(3)), now), "3 days ago");
    }

    #[test]
    fn test_age_beyond_a_week_is_a_calendar_date() {
        let now = DateTime::parse_from_rfc3339("2026-08-07T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let created = now - Duration::days(10);
        assert_eq!(format_age(Some(created), now), "28 Jul 2026");
    }

    #[test]
    fn test_age_unknown_without_timestamp() {
        assert_eq!(format_age(None, Utc::now()), "unknown");
    }

    #[test]
    fn test_size_two_decimal_mebibytes() {
        assert_eq!(format_size(Some(1_048_576)), "1.00 MB");
        assert_eq!(format_size(Some(2_621_440)), "2.50 MB");
    }

    #[test]
    fn test_size_unknown_when_absent() {
        assert_eq!(format_size(None), "unknown");
        assert_eq!(format_size(Some(0)), "unknown");
    }

    #[test]
    fn test_display_title_strips_key_decorations() {
        assert_eq!(display_title("12345_notes.pdf"), "notes");
        assert_eq!(display_title("lecture.pdf"), "lecture");
        assert_eq!(display_title("lecture.PDF"), "lecture");
    }

    #[test]
    fn test_display_title_never_empty() {
        assert_eq!(display_title(".pdf"), "PDF file");
    }
}
