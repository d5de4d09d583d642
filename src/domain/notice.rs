//! Notice building blocks: comparison items, contact info, tone and type.

use serde::{Deserialize, Serialize};

/// A rendered "original vs. infringing" pair.
///
/// Derived, never stored independently: regenerated per notice-generation
/// request from the current evidence set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonItem {
    /// Description of the original work
    pub original: String,

    /// Description of the infringing material found at the source URL
    pub infringing: String,
}

impl ComparisonItem {
    pub fn new(original: impl Into<String>, infringing: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            infringing: infringing.into(),
        }
    }

    /// Case-insensitive dedup key over the normalized pair
    pub fn dedup_key(&self) -> String {
        format!(
            "{}||{}",
            self.original.trim().to_lowercase(),
            self.infringing.trim().to_lowercase()
        )
    }
}

/// Kind of legal document to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeType {
    DmcaTakedown,
    CeaseAndDesist,
}

/// Tone of the rendered notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoticeTone {
    FormalLegal,
    Urgent,
    FriendlyFirm,
    #[default]
    Default,
}

/// Copyright-holder contact block for the signature section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_case_insensitive() {
        let a = ComparisonItem::new("Original Work", "Infringing Copy");
        let b = ComparisonItem::new("original work", "INFRINGING COPY  ");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_tone_default() {
        assert_eq!(NoticeTone::default(), NoticeTone::Default);
    }
}
