//! Infringement classifier.
//!
//! Gates candidate results before any evidence capture happens. A candidate
//! is classified with a few-shot prompt grounded in previously human-verified
//! examples; gateway failures degrade per the configured failure policy
//! (fail-open by default: let the item through at confidence 0.5 so a human
//! reviewer sees it).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::config::{ClassifierSettings, FailurePolicy};
use crate::domain::{CandidateResult, FilterVerdict, InfringementType, Product};
use crate::gateway::{GatewayRequest, LlmGateway};

/// A previously human-verified example used for few-shot grounding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedExample {
    pub platform: String,
    pub source_url: String,
    /// Why the human reviewer confirmed or rejected it
    pub reasoning: String,
}

/// Confirmed labels pulled from prior human verification. Both lists may
/// be empty for a new product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnedExamples {
    #[serde(default)]
    pub confirmed_infringements: Vec<LearnedExample>,
    #[serde(default)]
    pub confirmed_false_positives: Vec<LearnedExample>,
}

/// Raw JSON shape expected back from the model
#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_infringement: bool,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    infringement_type: Option<String>,
}

/// Classifier over a gateway backend
pub struct InfringementClassifier {
    gateway: Arc<dyn LlmGateway>,
    settings: ClassifierSettings,
}

impl InfringementClassifier {
    pub fn new(gateway: Arc<dyn LlmGateway>, settings: ClassifierSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Classify a single candidate.
    ///
    /// Never returns an error: gateway failures and malformed responses
    /// degrade to the configured failure policy's verdict.
    #[instrument(skip(self, candidate, product, examples), fields(url = %candidate.source_url))]
    pub async fn classify(
        &self,
        candidate: &CandidateResult,
        product: &Product,
        examples: &LearnedExamples,
    ) -> FilterVerdict {
        if candidate.source_url.is_empty() || candidate.platform.is_empty() {
            return self.degraded_verdict("candidate missing source URL or platform");
        }

        let request = GatewayRequest::new(
            SYSTEM_PROMPT,
            build_user_prompt(candidate, product, examples),
        );

        match self.gateway.complete(request).await {
            Ok(response) => match validate_verdict(&response.data) {
                Some(verdict) => verdict,
                None => {
                    warn!(url = %candidate.source_url, "Classifier response failed shape validation");
                    self.degraded_verdict("classifier response failed validation")
                }
            },
            Err(e) => {
                warn!(url = %candidate.source_url, error = %e, "Gateway error during classification");
                self.degraded_verdict(format!("gateway error: {}", e))
            }
        }
    }

    /// Classify candidates in fixed-size concurrent groups and return the
    /// promoted subset in input order.
    ///
    /// A candidate is promoted only if `is_infringement && confidence >=
    /// min_confidence`. Per-item failures degrade individually; a batch
    /// never aborts because one item errored.
    #[instrument(skip_all, fields(candidates = candidates.len(), product = %product.name))]
    pub async fn classify_batch(
        &self,
        candidates: Vec<CandidateResult>,
        product: &Product,
        examples: &LearnedExamples,
    ) -> Vec<(CandidateResult, FilterVerdict)> {
        let min_confidence = self.settings.min_confidence;
        let mut promoted = Vec::new();

        for (group_idx, group) in candidates.chunks(self.settings.batch_size).enumerate() {
            if group_idx > 0 {
                // Coarse throttle between groups for upstream rate limits
                tokio::time::sleep(self.settings.batch_delay).await;
            }

            let mut set: JoinSet<(usize, FilterVerdict)> = JoinSet::new();
            for (idx, candidate) in group.iter().enumerate() {
                let gateway = Arc::clone(&self.gateway);
                let settings = self.settings.clone();
                let candidate = candidate.clone();
                let product = product.clone();
                let examples = examples.clone();
                set.spawn(async move {
                    let classifier = InfringementClassifier::new(gateway, settings);
                    let verdict = classifier.classify(&candidate, &product, &examples).await;
                    (idx, verdict)
                });
            }

            let mut verdicts: Vec<Option<FilterVerdict>> = vec![None; group.len()];
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((idx, verdict)) => verdicts[idx] = Some(verdict),
                    Err(e) => warn!(error = %e, "Classification task panicked"),
                }
            }

            for (candidate, verdict) in group.iter().zip(verdicts.into_iter()) {
                let verdict =
                    verdict.unwrap_or_else(|| self.degraded_verdict("classification task lost"));

                if verdict.passes(min_confidence) {
                    debug!(url = %candidate.source_url, confidence = verdict.confidence, "Candidate promoted");
                    promoted.push((candidate.clone(), verdict));
                } else {
                    info!(
                        url = %candidate.source_url,
                        confidence = verdict.confidence,
                        reasoning = %verdict.reasoning,
                        "Candidate filtered out"
                    );
                }
            }
        }

        promoted
    }

    fn degraded_verdict(&self, reason: impl Into<String>) -> FilterVerdict {
        match self.settings.failure_policy {
            FailurePolicy::FailOpen => FilterVerdict::fail_open(reason),
            FailurePolicy::FailClosed => FilterVerdict::fail_closed(reason),
        }
    }
}

const SYSTEM_PROMPT: &str = "\
You are an intellectual-property analyst reviewing search results for \
evidence that a digital product is being distributed without authorization. \
Respond only with a JSON object of the shape \
{\"is_infringement\": bool, \"confidence\": number 0-1, \"reasoning\": string, \
\"infringement_type\": \"piracy\" | \"unauthorized_sale\" | \"counterfeit\" | \"unknown\"}.

Treat as POSITIVE signals: free copies of paid content, cracked or nulled \
distributions, download links for the full product, unauthorized resale below \
the official price.
Treat as NEGATIVE signals: reviews, tutorials, official resellers, casual \
mentions, discussion threads without distribution.";

fn build_user_prompt(
    candidate: &CandidateResult,
    product: &Product,
    examples: &LearnedExamples,
) -> String {
    let mut prompt = format!(
        "Product under protection:\n\
         - Name: {}\n\
         - Type: {}\n\
         - Official price: ${:.2}\n\
         - Official URL: {}\n\n\
         Candidate result:\n\
         - Platform: {}\n\
         - URL: {}\n\
         - Discovery risk level: {:?}\n",
        product.name,
        product.product_type,
        product.price,
        product.official_url,
        candidate.platform,
        candidate.source_url,
        candidate.risk_level,
    );

    if let Some(audience) = candidate.audience_estimate {
        prompt.push_str(&format!("- Estimated audience: {}\n", audience));
    }

    if !examples.confirmed_infringements.is_empty() {
        prompt.push_str("\nPreviously confirmed infringements for this product:\n");
        for ex in &examples.confirmed_infringements {
            prompt.push_str(&format!("- [{}] {}: {}\n", ex.platform, ex.source_url, ex.reasoning));
        }
    }

    if !examples.confirmed_false_positives.is_empty() {
        prompt.push_str("\nPreviously confirmed false positives:\n");
        for ex in &examples.confirmed_false_positives {
            prompt.push_str(&format!("- [{}] {}: {}\n", ex.platform, ex.source_url, ex.reasoning));
        }
    }

    prompt.push_str("\nClassify the candidate result.");
    prompt
}

/// Validate the model's response shape.
///
/// Requires a boolean verdict, a confidence in [0,1], and a non-empty
/// reasoning string; anything else is rejected and the caller degrades
/// per policy.
fn validate_verdict(data: &serde_json::Value) -> Option<FilterVerdict> {
    let raw: RawVerdict = serde_json::from_value(data.clone()).ok()?;

    if !(0.0..=1.0).contains(&raw.confidence) {
        return None;
    }
    if raw.reasoning.trim().is_empty() {
        return None;
    }

    let infringement_type = raw.infringement_type.as_deref().map(|t| match t {
        "piracy" => InfringementType::Piracy,
        "unauthorized_sale" => InfringementType::UnauthorizedSale,
        "counterfeit" => InfringementType::Counterfeit,
        _ => InfringementType::Unknown,
    });

    Some(FilterVerdict {
        is_infringement: raw.is_infringement,
        confidence: raw.confidence,
        reasoning: raw.reasoning,
        infringement_type,
    })
}
