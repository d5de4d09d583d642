//! End-to-end pipeline for a single candidate URL.
//!
//! Wires classify → capture → extract → compare → render and retains the
//! audit trail a human reviewer needs: the snapshot hash, every surviving
//! evidence match, and which tier each comparison item came from. Each
//! run is independent and order-insensitive; concurrent runs against the
//! same URL simply produce distinct, independently-hashed snapshots.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::capture::PageCapturer;
use crate::classifier::{InfringementClassifier, LearnedExamples};
use crate::comparison::{ComparisonBuilder, EvidenceTier, EvidenceTiers};
use crate::domain::{
    CandidateResult, ComparisonItem, ContactInfo, EvidenceMatch, FilterVerdict, NoticeTone,
    NoticeType, PageSnapshot, Product,
};
use crate::evidence::EvidenceExtractor;
use crate::gateway::LlmGateway;
use crate::notice;

/// How a candidate fared in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// The candidate that was processed
    pub candidate: CandidateResult,

    /// Classifier verdict that gated (or degraded through) the run
    pub verdict: FilterVerdict,

    /// Captured snapshot, present when the candidate passed the gate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PageSnapshot>,

    /// Grounded evidence matches
    pub matches: Vec<EvidenceMatch>,

    /// Comparison items with the tier each one came from
    pub comparisons: Vec<(ComparisonItem, EvidenceTier)>,

    /// The rendered notice text, when the candidate passed the gate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_text: Option<String>,
}

impl PipelineOutcome {
    fn filtered(candidate: CandidateResult, verdict: FilterVerdict) -> Self {
        Self {
            candidate,
            verdict,
            snapshot: None,
            matches: Vec::new(),
            comparisons: Vec::new(),
            notice_text: None,
        }
    }
}

/// The full evidence-to-notice pipeline for one product
pub struct InfringementPipeline {
    classifier: InfringementClassifier,
    capturer: PageCapturer,
    extractor: EvidenceExtractor,
    builder: ComparisonBuilder,
    notice_type: NoticeType,
    tone: NoticeTone,
}

impl InfringementPipeline {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        classifier_settings: crate::config::ClassifierSettings,
        capturer: PageCapturer,
    ) -> Self {
        Self {
            classifier: InfringementClassifier::new(Arc::clone(&gateway), classifier_settings),
            capturer,
            extractor: EvidenceExtractor::new(gateway),
            builder: ComparisonBuilder::new(),
            notice_type: NoticeType::DmcaTakedown,
            tone: NoticeTone::default(),
        }
    }

    pub fn with_notice_type(mut self, notice_type: NoticeType) -> Self {
        self.notice_type = notice_type;
        self
    }

    pub fn with_tone(mut self, tone: NoticeTone) -> Self {
        self.tone = tone;
        self
    }

    /// Run one candidate through the full pipeline.
    ///
    /// A candidate that fails the classifier gate gets a filtered outcome
    /// with the verdict retained; everything downstream of the gate
    /// degrades rather than fails, so the outcome always carries whatever
    /// evidence could be assembled.
    #[instrument(skip_all, fields(url = %candidate.source_url, product = %product.name))]
    pub async fn run(
        &self,
        candidate: CandidateResult,
        product: &Product,
        examples: &LearnedExamples,
        contact: &ContactInfo,
    ) -> PipelineOutcome {
        let verdict = self.classifier.classify(&candidate, product, examples).await;

        if !verdict.passes(self.classifier.settings().min_confidence) {
            info!(
                confidence = verdict.confidence,
                reasoning = %verdict.reasoning,
                "Candidate did not clear the classification gate"
            );
            return PipelineOutcome::filtered(candidate, verdict);
        }

        let subject_id = Uuid::new_v4();
        let snapshot = self
            .capturer
            .capture(&candidate.source_url, product.owner_id, subject_id)
            .await;

        let matches = self.extractor.extract(&snapshot, product).await;

        let tiers = EvidenceTiers {
            curated: Vec::new(),
            matches: matches.clone(),
            raw_excerpts: Vec::new(),
            page_title: Some(snapshot.title.clone()),
            page_text: Some(snapshot.text.clone()),
        };

        let comparisons = self
            .builder
            .build_traced(product, &candidate.source_url, &tiers);

        let items: Vec<ComparisonItem> = comparisons.iter().map(|(i, _)| i.clone()).collect();
        let notice_text = notice::render(self.notice_type, &items, contact, self.tone);

        info!(
            hash = %snapshot.content_hash,
            matches = matches.len(),
            comparisons = comparisons.len(),
            "Pipeline run complete"
        );

        PipelineOutcome {
            candidate,
            verdict,
            snapshot: Some(snapshot),
            matches,
            comparisons,
            notice_text: Some(notice_text),
        }
    }
}
