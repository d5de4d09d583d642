//! Candidate results surfaced by upstream discovery, and classifier verdicts.

use serde::{Deserialize, Serialize};

/// One URL surfaced by the discovery crawler.
///
/// Transient: consumed by the classifier and either promoted into an
/// infringement record (external) or discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Platform label (e.g. "forum", "file-host", "marketplace")
    pub platform: String,

    /// The URL where the candidate was found
    pub source_url: String,

    /// Coarse risk assessment from discovery
    #[serde(default)]
    pub risk_level: RiskLevel,

    /// Estimated audience size of the hosting site, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_estimate: Option<u64>,
}

/// Coarse risk level assigned by discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Category of infringement identified by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfringementType {
    /// Free distribution of paid content
    Piracy,
    /// Reselling without authorization
    UnauthorizedSale,
    /// Imitation product passed off as the original
    Counterfeit,
    /// Classifier could not determine the category
    Unknown,
}

/// Output of the infringement classifier.
///
/// Used once to gate promotion, never persisted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterVerdict {
    /// Whether the candidate looks like a genuine infringement
    pub is_infringement: bool,

    /// Classifier confidence in [0, 1]
    pub confidence: f64,

    /// Human-readable reasoning behind the verdict
    pub reasoning: String,

    /// Category, if the classifier could determine one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infringement_type: Option<InfringementType>,
}

impl FilterVerdict {
    /// The fail-open verdict used when the model errors or returns garbage.
    ///
    /// Confidence 0.5 routes the item to human review instead of silently
    /// dropping a possible true positive.
    pub fn fail_open(reason: impl Into<String>) -> Self {
        Self {
            is_infringement: true,
            confidence: 0.5,
            reasoning: reason.into(),
            infringement_type: Some(InfringementType::Unknown),
        }
    }

    /// The fail-closed counterpart: drop the item on classifier failure.
    pub fn fail_closed(reason: impl Into<String>) -> Self {
        Self {
            is_infringement: false,
            confidence: 0.5,
            reasoning: reason.into(),
            infringement_type: None,
        }
    }

    /// Whether this verdict clears the promotion gate
    pub fn passes(&self, min_confidence: f64) -> bool {
        self.is_infringement && self.confidence >= min_confidence
    }
}
