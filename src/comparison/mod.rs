//! Comparison builder.
//!
//! Assembles ranked "original vs. infringing" pairs from whatever evidence
//! survived the earlier stages, consulting tiers in strict priority order
//! and stopping at the item cap. The builder never fabricates a pairing:
//! every infringing string traces back to text actually present in the
//! snapshot or to metadata already verified elsewhere.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{ComparisonItem, EvidenceMatch, Product, Severity};
use crate::evidence::spans::find_quote;

/// Maximum comparison items per notice
pub const MAX_ITEMS: usize = 10;

/// Which tier a comparison item came from, kept for the reviewer audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceTier {
    AiCurated,
    StructuredMatch,
    RawExcerpt,
    TitleCoincidence,
    Boilerplate,
    VerbatimIdentifier,
}

/// An AI-curated pair with pre-formatted legal language.
///
/// Trusted as-is because its quote already passed the extractor's
/// grounding check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedComparison {
    pub original: String,
    pub infringing: String,
    pub severity: Severity,
}

/// Evidence available for comparison building, in descending quality order
#[derive(Debug, Clone, Default)]
pub struct EvidenceTiers {
    /// Tier 1: AI-curated, significance-ranked pairs
    pub curated: Vec<CuratedComparison>,

    /// Tier 2: structured grounded matches
    pub matches: Vec<EvidenceMatch>,

    /// Tier 3: raw matched-text excerpts without structure
    pub raw_excerpts: Vec<String>,

    /// Tier 4: the captured page title
    pub page_title: Option<String>,

    /// Tier 6: the captured page text, searched for verbatim identifiers
    pub page_text: Option<String>,
}

/// Builds comparison items from tiered evidence
pub struct ComparisonBuilder {
    max_items: usize,
}

impl Default for ComparisonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonBuilder {
    pub fn new() -> Self {
        Self {
            max_items: MAX_ITEMS,
        }
    }

    #[cfg(test)]
    fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Build 1..=10 comparison items for a notice.
    ///
    /// Tiers are consulted in priority order; repeated (original,
    /// infringing) pairs are skipped case-insensitively. Tier 5 boilerplate
    /// guarantees at least one item.
    pub fn build(
        &self,
        product: &Product,
        source_url: &str,
        tiers: &EvidenceTiers,
    ) -> Vec<ComparisonItem> {
        self.build_traced(product, source_url, tiers)
            .into_iter()
            .map(|(item, _)| item)
            .collect()
    }

    /// Like [`build`](Self::build), but each item carries the tier it came
    /// from so a reviewer can see the evidence provenance.
    #[instrument(skip_all, fields(product = %product.name, %source_url))]
    pub fn build_traced(
        &self,
        product: &Product,
        source_url: &str,
        tiers: &EvidenceTiers,
    ) -> Vec<(ComparisonItem, EvidenceTier)> {
        let mut items: Vec<(ComparisonItem, EvidenceTier)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        // Tier 1: curated pairs, most significant first
        let mut curated = tiers.curated.clone();
        curated.sort_by(|a, b| b.severity.cmp(&a.severity));
        for pair in curated {
            if items.len() >= self.max_items {
                break;
            }
            self.push(
                &mut items,
                &mut seen,
                ComparisonItem::new(pair.original, pair.infringing),
                EvidenceTier::AiCurated,
            );
        }

        // Tier 2: structured matches
        for m in &tiers.matches {
            if items.len() >= self.max_items {
                break;
            }
            self.push(
                &mut items,
                &mut seen,
                ComparisonItem::new(
                    format!("Original text from \"{}\": \"{}\"", product.name, m.matched_text),
                    format!("Same text found at {}: \"{}\"", source_url, m.context),
                ),
                EvidenceTier::StructuredMatch,
            );
        }

        // Tier 3: raw excerpts
        for excerpt in &tiers.raw_excerpts {
            if items.len() >= self.max_items {
                break;
            }
            self.push(
                &mut items,
                &mut seen,
                ComparisonItem::new(
                    format!("Content from \"{}\"", product.name),
                    format!("Excerpt found at {}: \"{}\"", source_url, excerpt),
                ),
                EvidenceTier::RawExcerpt,
            );
        }

        // Tier 4: page-title coincidence
        if items.len() < self.max_items {
            if let Some(title) = tiers.page_title.as_deref() {
                if !title.is_empty() && find_quote(title, &product.name).is_some() {
                    self.push(
                        &mut items,
                        &mut seen,
                        ComparisonItem::new(
                            format!("Product name: \"{}\"", product.name),
                            format!("Page at {} is titled \"{}\"", source_url, title),
                        ),
                        EvidenceTier::TitleCoincidence,
                    );
                }
            }
        }

        // Tier 5: product-type boilerplate, always includible
        if items.len() < self.max_items {
            self.push(
                &mut items,
                &mut seen,
                ComparisonItem::new(
                    format!(
                        "\"{}\", a {} sold at {} for ${:.2}",
                        product.name, product.product_type, product.official_url, product.price
                    ),
                    format!("Unauthorized copy or distribution found at {}", source_url),
                ),
                EvidenceTier::Boilerplate,
            );
        }

        // Tier 6: verbatim brand identifiers, unique phrases, copyrighted terms
        if let Some(text) = tiers.page_text.as_deref() {
            let identifier_groups = [
                ("Brand identifier", &product.brand_identifiers),
                ("Unique marketing phrase", &product.unique_phrases),
                ("Copyrighted term", &product.copyrighted_terms),
            ];
            for (label, terms) in identifier_groups {
                for term in terms {
                    if items.len() >= self.max_items {
                        break;
                    }
                    if find_quote(text, term).is_some() {
                        self.push(
                            &mut items,
                            &mut seen,
                            ComparisonItem::new(
                                format!("{}: \"{}\"", label, term),
                                format!("Found verbatim at {}", source_url),
                            ),
                            EvidenceTier::VerbatimIdentifier,
                        );
                    }
                }
            }
        }

        debug!(items = items.len(), "Comparison items built");
        items
    }

    fn push(
        &self,
        items: &mut Vec<(ComparisonItem, EvidenceTier)>,
        seen: &mut HashSet<String>,
        item: ComparisonItem,
        tier: EvidenceTier,
    ) {
        if seen.insert(item.dedup_key()) {
            items.push((item, tier));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatchType;
    use uuid::Uuid;

    fn product() -> Product {
        Product {
            owner_id: Uuid::nil(),
            name: "10x Bars Indicator".to_string(),
            product_type: "trading indicator".to_string(),
            price: 199.0,
            official_url: "https://example.com/10x-bars".to_string(),
            brand_identifiers: vec!["10x Bars".to_string()],
            copyrighted_terms: vec!["proprietary bar-stacking algorithm".to_string()],
            unique_phrases: vec!["trade the bars, not the noise".to_string()],
            keywords: vec![],
        }
    }

    fn evidence_match(text: &str) -> EvidenceMatch {
        EvidenceMatch {
            match_type: MatchType::BrandMention,
            matched_text: text.to_string(),
            context: format!("...{}...", text),
            position: 0,
            confidence: 0.6,
            severity: Severity::Strong,
        }
    }

    const URL: &str = "https://pirate.example/thread";

    #[test]
    fn test_boilerplate_always_yields_an_item() {
        let items = ComparisonBuilder::new().build(&product(), URL, &EvidenceTiers::default());
        assert_eq!(items.len(), 1);
        assert!(items[0].original.contains("10x Bars Indicator"));
        assert!(items[0].infringing.contains(URL));
    }

    #[test]
    fn test_cap_at_ten_items() {
        let tiers = EvidenceTiers {
            matches: (0..15).map(|i| evidence_match(&format!("excerpt {}", i))).collect(),
            raw_excerpts: (0..15).map(|i| format!("raw {}", i)).collect(),
            ..Default::default()
        };

        let items = ComparisonBuilder::new().build(&product(), URL, &tiers);
        assert_eq!(items.len(), MAX_ITEMS);
    }

    #[test]
    fn test_dedup_same_pair_once() {
        let tiers = EvidenceTiers {
            matches: vec![evidence_match("copied text"), evidence_match("copied text")],
            ..Default::default()
        };

        let builder = ComparisonBuilder::new().with_max_items(2);
        let items = builder.build(&product(), URL, &tiers);
        assert_eq!(items.len(), 2);
        // One from the duplicate pair, one boilerplate
        assert_ne!(items[0].dedup_key(), items[1].dedup_key());
    }

    #[test]
    fn test_curated_ranked_by_significance() {
        let tiers = EvidenceTiers {
            curated: vec![
                CuratedComparison {
                    original: "supporting original".to_string(),
                    infringing: "supporting copy".to_string(),
                    severity: Severity::Supporting,
                },
                CuratedComparison {
                    original: "critical original".to_string(),
                    infringing: "critical copy".to_string(),
                    severity: Severity::Critical,
                },
                CuratedComparison {
                    original: "strong original".to_string(),
                    infringing: "strong copy".to_string(),
                    severity: Severity::Strong,
                },
            ],
            ..Default::default()
        };

        let items = ComparisonBuilder::new().build(&product(), URL, &tiers);
        assert_eq!(items[0].original, "critical original");
        assert_eq!(items[1].original, "strong original");
        assert_eq!(items[2].original, "supporting original");
    }

    #[test]
    fn test_title_coincidence_requires_name_in_title() {
        let with_name = EvidenceTiers {
            page_title: Some("Download 10x Bars Indicator FREE".to_string()),
            ..Default::default()
        };
        let items = ComparisonBuilder::new().build(&product(), URL, &with_name);
        assert!(items.iter().any(|i| i.infringing.contains("is titled")));

        let without_name = EvidenceTiers {
            page_title: Some("Totally unrelated page".to_string()),
            ..Default::default()
        };
        let items = ComparisonBuilder::new().build(&product(), URL, &without_name);
        assert!(!items.iter().any(|i| i.infringing.contains("is titled")));
    }

    #[test]
    fn test_identifier_tier_requires_verbatim_presence() {
        let tiers = EvidenceTiers {
            page_text: Some(
                "Get 10x Bars cheap! Trade the bars, not the noise.".to_string(),
            ),
            ..Default::default()
        };

        let items = ComparisonBuilder::new().build(&product(), URL, &tiers);

        assert!(items.iter().any(|i| i.original.contains("Brand identifier")));
        assert!(items
            .iter()
            .any(|i| i.original.contains("Unique marketing phrase")));
        // Copyrighted term is absent from the page text
        assert!(!items.iter().any(|i| i.original.contains("Copyrighted term")));
    }
}
