//! Gender tokens and the category dictionary
//!
//! All matching happens on *token text*: the input is lowercased and every
//! run of non-alphanumeric characters becomes a single space, so `/Men's-Jackets`
//! reads as ` men s jackets `. A keyword matches only as a whole word or whole
//! phrase, never as a substring of an unrelated word.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audience a listing page is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const WOMEN_TOKENS: &[&str] = &["women", "womens", "woman"];
const MEN_TOKENS: &[&str] = &["men", "mens", "man"];

/// One canonical category and the words that point at it
#[derive(Debug, Clone, Copy)]
pub struct CategoryEntry {
    pub canonical: &'static str,
    pub keywords: &'static [&'static str],
    /// Collection buckets mark listing pages but never tag products
    pub collection: bool,
}

const fn category(canonical: &'static str, keywords: &'static [&'static str]) -> CategoryEntry {
    CategoryEntry {
        canonical,
        keywords,
        collection: false,
    }
}

const fn collection(canonical: &'static str, keywords: &'static [&'static str]) -> CategoryEntry {
    CategoryEntry {
        canonical,
        keywords,
        collection: true,
    }
}

pub const CATEGORY_DICTIONARY: &[CategoryEntry] = &[
    category(
        "jackets",
        &["jacket", "jackets", "snowboard jackets", "ski jackets", "outerwear"],
    ),
    category(
        "pants",
        &["pant", "pants", "snowboard pants", "ski pants", "bib", "bibs"],
    ),
    category("leggings", &["legging", "leggings"]),
    category("goggles", &["goggle", "goggles"]),
    category("fleece", &["fleece"]),
    category(
        "base-layers",
        &["base layer", "base layers", "baselayer", "baselayers"],
    ),
    category("hoodies", &["hoodie", "hoodies"]),
    category("t-shirts", &["t shirt", "t shirts", "tee", "tees"]),
    category("beanies", &["beanie", "beanies"]),
    category("gloves", &["glove", "gloves", "snowboard gloves"]),
    category("helmets", &["helmet", "helmets", "ski helmets"]),
    category(
        "facemasks",
        &["facemask", "facemasks", "balaclava", "mask"],
    ),
    category("ski-socks", &["ski sock", "ski socks", "socks"]),
    category("backpacks", &["backpack", "backpacks", "bag", "bags"]),
    collection("bestsellers", &["bestseller", "best sellers", "bestsellers"]),
    collection(
        "new-arrivals",
        &["new in", "new arrivals", "new arrival"],
    ),
    collection("sale", &["sale", "discount"]),
];

/// Labels that name a collection or navigation level rather than a product type
const COLLECTION_LABELS: &[&str] = &["home", "shop", "bestsellers", "new-arrivals", "sale"];

/// Loose substrings used to keep product-relevant sitemap URLs
pub const SITEMAP_KEYWORDS: &[&str] = &[
    "men", "women", "snow", "jacket", "pant", "hoodie", "goggle", "fleece", "base", "t-shirt",
    "beanie", "glove", "helmet", "mask", "sock", "backpack", "outerwear", "facemask",
];

/// Lowercases `text` and turns every non-alphanumeric run into one space,
/// padded with a space on both ends
pub fn token_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if !out.ends_with(' ') {
        out.push(' ');
    }
    out
}

/// Returns true if `phrase` appears in `tokens` (as produced by [`token_text`])
/// as whole words
pub fn contains_phrase(tokens: &str, phrase: &str) -> bool {
    let needle = token_text(phrase);
    !needle.trim().is_empty() && tokens.contains(&needle)
}

fn contains_any(tokens: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| contains_phrase(tokens, phrase))
}

/// Detects the audience of a page from free text
///
/// Women markers take precedence: if any women token is present the result
/// is `Women`, otherwise a men token gives `Men`.
pub fn detect_gender(text: &str) -> Option<Gender> {
    let tokens = token_text(text);
    if contains_any(&tokens, WOMEN_TOKENS) {
        Some(Gender::Women)
    } else if contains_any(&tokens, MEN_TOKENS) {
        Some(Gender::Men)
    } else {
        None
    }
}

/// Returns true if the text carries an explicit gender marker
pub fn has_gender_token(text: &str) -> bool {
    detect_gender(text).is_some()
}

/// Infers product categories from free text, in dictionary order
///
/// Collection buckets are never returned.
pub fn infer_categories(text: &str) -> Vec<String> {
    let tokens = token_text(text);
    CATEGORY_DICTIONARY
        .iter()
        .filter(|entry| !entry.collection)
        .filter(|entry| contains_any(&tokens, entry.keywords))
        .map(|entry| entry.canonical.to_string())
        .collect()
}

/// Returns true if the text names any dictionary entry, collection buckets included
pub fn has_listing_signal(text: &str) -> bool {
    let tokens = token_text(text);
    CATEGORY_DICTIONARY
        .iter()
        .any(|entry| contains_any(&tokens, entry.keywords))
}

/// Returns true for labels such as "Home", "Shop" or "sale" that must not
/// end up in a product's category list
pub fn is_collection_label(label: &str) -> bool {
    let lowered = label.trim().to_lowercase();
    COLLECTION_LABELS.contains(&lowered.as_str())
}

/// Returns true if a sitemap URL looks worth crawling
pub fn is_product_relevant(url: &str) -> bool {
    let lowered = url.to_lowercase();
    SITEMAP_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
