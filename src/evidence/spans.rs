//! Grounding primitives for evidence verification.
//!
//! Functions for locating quotes in captured page text, computing
//! chain-of-custody hashes, and extracting context windows.
//!
//! # Design decisions
//!
//! - **Case-insensitive match**: page text is matched against model quotes
//!   after ASCII lowercasing; offsets refer to the original text.
//! - **Honest rejection**: a quote that cannot be located is discarded,
//!   never approximated.
//! - **UTF-8 byte offsets**: all offsets are byte indices into the
//!   snapshot's extracted text.

use sha2::{Digest, Sha256};

/// Result of searching for a quote in page text
#[derive(Debug, Clone)]
pub struct QuoteMatch {
    /// Byte offset where the quote starts in the original text
    pub position: usize,

    /// Length in bytes of the matched region
    pub len: usize,
}

/// Locate a quote case-insensitively inside page text.
///
/// Returns the first match; `None` means the quote is not grounded in the
/// text and must be rejected. Lowercasing is ASCII-only so byte offsets in
/// the lowered string remain valid in the original.
pub fn find_quote(text: &str, quote: &str) -> Option<QuoteMatch> {
    if quote.is_empty() || quote.len() > text.len() {
        return None;
    }

    let haystack = text.to_ascii_lowercase();
    let needle = quote.to_ascii_lowercase();

    haystack.find(&needle).map(|position| QuoteMatch {
        position,
        len: needle.len(),
    })
}

/// Check the grounding invariant for an already-positioned match.
///
/// True iff the text at `position` case-insensitively equals `quote`.
pub fn verify_position(text: &str, quote: &str, position: usize) -> bool {
    let end = position + quote.len();
    if end > text.len() || !text.is_char_boundary(position) || !text.is_char_boundary(end) {
        return false;
    }
    text[position..end].eq_ignore_ascii_case(quote)
}

/// Compute SHA256 hash of a byte slice, returning "sha256:<hex>"
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Recompute-and-compare integrity check for a stored page.
///
/// Returns false on mismatch; the caller decides policy (re-capture, flag
/// for legal review).
pub fn verify_hash(bytes: &[u8], recorded_hash: &str) -> bool {
    compute_hash(bytes) == recorded_hash
}

/// Extract a context window around a matched region.
///
/// Expands `pad` bytes on each side, clamped to UTF-8 boundaries, with
/// ellipses marking truncation.
pub fn context_window(text: &str, start: usize, end: usize, pad: usize) -> String {
    let mut window_start = start.saturating_sub(pad);
    while window_start > 0 && !text.is_char_boundary(window_start) {
        window_start -= 1;
    }

    let mut window_end = (end + pad).min(text.len());
    while window_end < text.len() && !text.is_char_boundary(window_end) {
        window_end += 1;
    }

    let prefix = if window_start > 0 { "..." } else { "" };
    let suffix = if window_end < text.len() { "..." } else { "" };

    format!("{}{}{}", prefix, &text[window_start..window_end], suffix)
}

/// Collapse whitespace runs to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
