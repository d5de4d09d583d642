//! Evidence extractor with grounding verification.
//!
//! Primary path: ask the gateway to quote suspicious passages, then verify
//! every returned quote byte-for-byte (case-insensitively) against the
//! snapshot text. Quotes that cannot be located are discarded and logged
//! as hallucinations; no ungrounded text ever reaches a stored match.
//!
//! Fallback path: deterministic substring search for the product name and
//! configured keywords. This path cannot hallucinate by construction and
//! is the floor the system falls back to when the model is unavailable.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::{EvidenceMatch, MatchType, PageSnapshot, Product, Severity};
use crate::gateway::{GatewayRequest, LlmGateway};

use super::spans::{compute_hash, context_window, find_quote};

/// Context padding around fallback matches, in bytes
const FALLBACK_CONTEXT_PAD: usize = 50;

/// Raw candidate match shape requested from the model
#[derive(Debug, Deserialize)]
struct RawMatch {
    match_type: String,
    exact_quote: String,
    #[serde(default)]
    context: String,
    confidence: f64,
    severity: String,
}

#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

/// Extracts grounded evidence matches from page snapshots
pub struct EvidenceExtractor {
    gateway: Option<Arc<dyn LlmGateway>>,
}

impl EvidenceExtractor {
    /// Extractor with a model-backed primary path
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway: Some(gateway),
        }
    }

    /// Extractor restricted to the deterministic fallback path
    pub fn fallback_only() -> Self {
        Self { gateway: None }
    }

    /// Extract evidence matches for `product` from `snapshot`.
    ///
    /// Every returned match satisfies the grounding invariant: its
    /// `matched_text` is present case-insensitively in `snapshot.text` at
    /// `position`.
    #[instrument(skip_all, fields(url = %snapshot.url, product = %product.name))]
    pub async fn extract(&self, snapshot: &PageSnapshot, product: &Product) -> Vec<EvidenceMatch> {
        if snapshot.text.is_empty() {
            debug!("Snapshot has no text, nothing to extract");
            return Vec::new();
        }

        // Chain-of-custody digest of the text being mined, independent of
        // the snapshot's raw-bytes hash
        let custody_hash = compute_hash(snapshot.text.as_bytes());
        debug!(%custody_hash, "Extracting evidence");

        if let Some(gateway) = &self.gateway {
            match self.extract_with_model(gateway.as_ref(), snapshot, product).await {
                Ok(matches) => return matches,
                Err(e) => {
                    warn!(error = %e, "Model extraction failed, falling back to substring search");
                }
            }
        }

        self.extract_fallback(snapshot, product)
    }

    /// Model-backed extraction with the grounding check applied
    async fn extract_with_model(
        &self,
        gateway: &dyn LlmGateway,
        snapshot: &PageSnapshot,
        product: &Product,
    ) -> anyhow::Result<Vec<EvidenceMatch>> {
        let request = GatewayRequest::new(
            EXTRACTION_SYSTEM_PROMPT,
            build_extraction_prompt(snapshot, product),
        );

        let response = gateway.complete(request).await?;
        let raw: RawExtraction = serde_json::from_value(response.data)?;

        let mut matches = Vec::new();
        for candidate in raw.matches {
            match find_quote(&snapshot.text, &candidate.exact_quote) {
                Some(located) => {
                    let context = if candidate.context.is_empty() {
                        context_window(
                            &snapshot.text,
                            located.position,
                            located.position + located.len,
                            FALLBACK_CONTEXT_PAD,
                        )
                    } else {
                        candidate.context
                    };

                    matches.push(EvidenceMatch {
                        match_type: parse_match_type(&candidate.match_type),
                        matched_text: candidate.exact_quote,
                        context,
                        position: located.position,
                        confidence: candidate.confidence.clamp(0.0, 1.0),
                        severity: parse_severity(&candidate.severity),
                    });
                }
                None => {
                    warn!(
                        quote = %candidate.exact_quote,
                        url = %snapshot.url,
                        "Discarding hallucinated quote not present in page text"
                    );
                }
            }
        }

        info!(kept = matches.len(), "Model extraction grounded");
        Ok(matches)
    }

    /// Deterministic substring search over product name and keywords
    fn extract_fallback(&self, snapshot: &PageSnapshot, product: &Product) -> Vec<EvidenceMatch> {
        let mut matches = Vec::new();

        for (idx, term) in product.search_terms().into_iter().enumerate() {
            let Some(located) = find_quote(&snapshot.text, term) else {
                continue;
            };

            let end = located.position + located.len;
            // First term is the product name itself; later ones are keywords
            let (match_type, confidence, severity) = if idx == 0 {
                (MatchType::BrandMention, 0.6, Severity::Strong)
            } else {
                (MatchType::UniquePhrase, 0.4, Severity::Supporting)
            };

            matches.push(EvidenceMatch {
                match_type,
                matched_text: snapshot.text[located.position..end].to_string(),
                context: context_window(&snapshot.text, located.position, end, FALLBACK_CONTEXT_PAD),
                position: located.position,
                confidence,
                severity,
            });
        }

        info!(found = matches.len(), "Fallback extraction complete");
        matches
    }

    /// Integrity check: recompute the hash of stored page bytes and compare
    /// to the recorded value. False signals tampering or content drift since
    /// capture; the caller decides policy.
    pub fn verify(&self, raw_html: &[u8], recorded_hash: &str) -> bool {
        super::spans::verify_hash(raw_html, recorded_hash)
    }
}

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You extract evidence of copyright infringement from captured web pages. \
Quote only text that exists verbatim in the provided content; never \
paraphrase, summarize, or invent text. Respond only with a JSON object \
{\"matches\": [{\"match_type\": \"brand_mention\" | \"unique_phrase\" | \
\"pricing\" | \"download_link\" | \"copyrighted_content\", \
\"exact_quote\": string, \"context\": string, \"confidence\": number 0-1, \
\"severity\": \"critical\" | \"strong\" | \"supporting\"}]}. \
Every exact_quote must be copied character-for-character from the page text.";

fn build_extraction_prompt(snapshot: &PageSnapshot, product: &Product) -> String {
    format!(
        "Protected product: {} ({}), official price ${:.2}.\n\
         Brand identifiers: {}\n\
         Unique phrases: {}\n\
         Copyrighted terms: {}\n\n\
         Captured page: {}\n\
         Page title: {}\n\n\
         Page text:\n{}",
        product.name,
        product.product_type,
        product.price,
        product.brand_identifiers.join(", "),
        product.unique_phrases.join(", "),
        product.copyrighted_terms.join(", "),
        snapshot.url,
        snapshot.title,
        snapshot.text,
    )
}

fn parse_match_type(raw: &str) -> MatchType {
    match raw {
        "brand_mention" => MatchType::BrandMention,
        "unique_phrase" => MatchType::UniquePhrase,
        "pricing" => MatchType::Pricing,
        "download_link" => MatchType::DownloadLink,
        "copyrighted_content" => MatchType::CopyrightedContent,
        _ => MatchType::BrandMention,
    }
}

fn parse_severity(raw: &str) -> Severity {
    match raw {
        "critical" => Severity::Critical,
        "strong" => Severity::Strong,
        _ => Severity::Supporting,
    }
}
