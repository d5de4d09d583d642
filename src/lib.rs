//! copysentry - Evidence verification and notice-assembly pipeline
//!
//! Scans candidate URLs for unauthorized copies of a protected digital
//! product, fixes cryptographic snapshots of infringing pages, extracts
//! grounded quoted evidence, and assembles DMCA takedown notices.
//!
//! # Architecture
//!
//! The pipeline treats the language model as untrusted input:
//! - The classifier gates candidates and fails open on model errors so
//!   uncertain items reach a human reviewer
//! - Every model-quoted passage is mechanically verified against the
//!   captured page text before it becomes stored evidence
//! - Snapshots are hash-anchored at capture time and independently
//!   timestamped via a public web archive
//!
//! # Modules
//!
//! - `gateway`: structured-completion wrapper around a hosted LLM
//! - `classifier`: confidence-gated infringement classification
//! - `capture`: page snapshot capture, storage, and archival
//! - `evidence`: grounded quote extraction and integrity checks
//! - `comparison`: tiered original-vs-infringing pair assembly
//! - `notice`: legal document templating
//! - `pipeline`: end-to-end wiring with the reviewer audit trail

pub mod cache;
pub mod capture;
pub mod classifier;
pub mod cli;
pub mod comparison;
pub mod config;
pub mod domain;
pub mod evidence;
pub mod gateway;
pub mod notice;
pub mod pipeline;

// Re-export main types at crate root for convenience
pub use capture::{FsSnapshotStore, PageCapturer, SnapshotStore};
pub use classifier::{InfringementClassifier, LearnedExample, LearnedExamples};
pub use comparison::{ComparisonBuilder, CuratedComparison, EvidenceTier, EvidenceTiers};
pub use domain::{
    CandidateResult, ComparisonItem, ContactInfo, EvidenceMatch, FilterVerdict, MatchType,
    NoticeTone, NoticeType, PageSnapshot, Product, Severity,
};
pub use evidence::EvidenceExtractor;
pub use gateway::{GatewayError, GatewayRequest, GatewayResponse, HttpGateway, LlmGateway};
pub use pipeline::{InfringementPipeline, PipelineOutcome};
