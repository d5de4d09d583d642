//! Page snapshots: captured evidence of one URL at one point in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evidence capture of a single page.
///
/// Immutable once created: re-capturing a URL produces a new snapshot,
/// never an in-place edit. `content_hash` covers the raw fetched bytes,
/// not the cleaned text, and anchors the chain of custody.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Owning user account
    pub owner_id: Uuid,

    /// The infringement/subject this snapshot belongs to
    pub subject_id: Uuid,

    /// The URL that was captured
    pub url: String,

    /// Page title (document title, falling back to og:title)
    pub title: String,

    /// Visible text, whitespace-normalized, capped at 50,000 chars
    pub text: String,

    /// Outbound links with resolved absolute URLs, capped at 500
    pub links: Vec<String>,

    /// "sha256:<hex>" digest of the raw HTML at capture time
    pub content_hash: String,

    /// Storage pointer to the persisted raw bytes, if archival succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,

    /// External archive URL for third-party timestamping, if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,

    /// When the capture happened
    pub captured_at: DateTime<Utc>,
}

impl PageSnapshot {
    /// Whether the fetch produced any usable content
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.title.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serialization_skips_absent_fields() {
        let snapshot = PageSnapshot {
            owner_id: Uuid::nil(),
            subject_id: Uuid::nil(),
            url: "https://example.com".to_string(),
            title: String::new(),
            text: String::new(),
            links: vec![],
            content_hash: "sha256:abc".to_string(),
            storage_path: None,
            archive_url: None,
            captured_at: Utc::now(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("storage_path"));
        assert!(!json.contains("archive_url"));
        assert!(snapshot.is_empty());
    }
}
