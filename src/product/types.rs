//! Product record types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::page::Gender;

/// Where a product URL was discovered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub gender: Option<Gender>,
    pub category: Option<String>,
    pub source_url: String,
}

impl Provenance {
    pub fn new(gender: Option<Gender>, category: Option<String>, source_url: impl Into<String>) -> Self {
        Self {
            gender,
            category,
            source_url: source_url.into(),
        }
    }
}

/// Fields parsed from one product page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    pub url: String,
    pub canonical_url: String,
    pub name: String,
    pub price: Option<f64>,
    pub currency: String,
    pub sku: String,
    pub brand: String,
    pub images: Vec<String>,
    pub description: String,
    pub categories: Vec<String>,
}

impl RawProduct {
    /// A record needs at least a name or a price to be worth keeping
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() || self.price.is_some()
    }
}

/// Audience of a merged product, derived from its provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderSummary {
    Men,
    Women,
    Both,
    Unknown,
}

impl GenderSummary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
            Self::Both => "both",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GenderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One merged product, the unit written to the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub url: String,
    pub canonical_url: String,
    pub name: String,
    pub price: Option<f64>,
    pub currency: String,
    pub sku: String,
    pub brand: String,
    pub images: Vec<String>,
    pub description: String,
    pub gender: GenderSummary,
    pub categories: Vec<String>,
    pub found_in: Vec<Provenance>,
}

/// A parsed record together with every provenance tuple recorded for its URL
#[derive(Debug, Clone)]
pub struct ProductObservation {
    pub record: RawProduct,
    pub provenance: Vec<Provenance>,
}
