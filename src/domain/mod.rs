//! Domain types for the evidence pipeline.
//!
//! This module contains the core data structures:
//! - Product: the protected work, read-only input to every stage
//! - CandidateResult / FilterVerdict: classifier input and output
//! - PageSnapshot: captured evidence of one URL at one point in time
//! - EvidenceMatch: a grounded quote tied to a snapshot
//! - ComparisonItem / notice types: building blocks of the rendered notice

pub mod candidate;
pub mod evidence;
pub mod notice;
pub mod product;
pub mod snapshot;

// Re-export commonly used types
pub use candidate::{CandidateResult, FilterVerdict, InfringementType, RiskLevel};
pub use evidence::{EvidenceMatch, MatchType, Severity};
pub use notice::{ComparisonItem, ContactInfo, NoticeTone, NoticeType};
pub use product::Product;
pub use snapshot::PageSnapshot;
