//! Evidence matches: grounded quotes tied to a page snapshot.

use serde::{Deserialize, Serialize};

/// Category of evidence a match represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// The brand or product name appears on the page
    BrandMention,
    /// A marketing phrase unique to the original sales copy
    UniquePhrase,
    /// Pricing that undercuts or mirrors the original
    Pricing,
    /// A link offering the protected work for download
    DownloadLink,
    /// Copyrighted content reproduced verbatim
    CopyrightedContent,
}

/// Legal significance of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Supporting,
    Strong,
    Critical,
}

/// One quoted excerpt tied to a snapshot.
///
/// Invariant: `matched_text` is present verbatim (case-insensitively) in the
/// snapshot's text at byte offset `position`. Candidates failing that check
/// are discarded before construction; see `evidence::extractor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceMatch {
    /// What kind of evidence this is
    pub match_type: MatchType,

    /// The exact text found on the page
    pub matched_text: String,

    /// Surrounding context from the page text
    pub context: String,

    /// Byte offset of `matched_text` within the snapshot text
    pub position: usize,

    /// Extractor confidence in [0, 1]
    pub confidence: f64,

    /// Legal significance ranking
    pub severity: Severity,
}
