//! The protected product.
//!
//! A Product is the catalog entity the pipeline protects. It is owned by a
//! user account and treated as a read-only input by every pipeline stage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A digital product under protection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Owning user account
    pub owner_id: Uuid,

    /// Product name (e.g. "10x Bars Indicator")
    pub name: String,

    /// Product type label (e.g. "trading indicator", "ebook", "plugin")
    pub product_type: String,

    /// List price in USD
    pub price: f64,

    /// Official sales URL
    pub official_url: String,

    /// Brand identifiers (trademarks, product line names)
    #[serde(default)]
    pub brand_identifiers: Vec<String>,

    /// Copyrighted terms expected to appear only in the original work
    #[serde(default)]
    pub copyrighted_terms: Vec<String>,

    /// Marketing phrases unique to the product's sales copy
    #[serde(default)]
    pub unique_phrases: Vec<String>,

    /// Search keywords used by discovery and fallback extraction
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Product {
    /// Load a product profile from a YAML file
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        serde_yaml::from_str(content).context("Failed to parse product profile YAML")
    }

    /// All terms the fallback extractor searches for: name first, then keywords
    pub fn search_terms(&self) -> Vec<&str> {
        let mut terms = vec![self.name.as_str()];
        terms.extend(self.keywords.iter().map(String::as_str));
        terms
    }
}
