//! Grounded evidence extraction.
//!
//! The model is treated as untrusted input: every quote it returns is
//! mechanically verified against the captured page text before it can
//! become an `EvidenceMatch`. The verbatim-substring check is an
//! architectural boundary, not a prompt instruction.

pub mod extractor;
pub mod spans;

pub use extractor::EvidenceExtractor;
pub use spans::{compute_hash, find_quote, verify_hash, verify_position};
