//! Page classification
//!
//! Decides whether a fetched page describes one product, lists many, or is
//! neither, and pulls the gender/category context used for provenance.

use scraper::Html;
use url::Url;

use super::document::{extract_heading, extract_title};
use super::structured::StructuredData;
use super::vocabulary::{detect_gender, has_listing_signal, infer_categories, Gender};
use crate::url::has_page_param;

/// Role of a page in the site graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Declares a structured Product; never expanded
    Product,
    /// Lists products; its links are harvested
    Listing,
    /// Anything else; fetched but not expanded
    Other,
}

/// Result of classifying one page
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub gender: Option<Gender>,
    pub categories: Vec<String>,
    pub title: Option<String>,
    pub heading: Option<String>,
    pub kind: PageKind,
}

impl ClassificationResult {
    pub fn is_product(&self) -> bool {
        self.kind == PageKind::Product
    }

    pub fn is_category(&self) -> bool {
        self.kind == PageKind::Listing
    }
}

/// Classifies a page from its markup and URL
///
/// # Arguments
///
/// * `html` - The fetched markup
/// * `url` - The URL the page was requested under
///
/// # Returns
///
/// The classification. A page declaring a structured Product is always
/// `PageKind::Product` and never a listing, whatever its URL says.
pub fn classify(html: &str, url: &Url) -> ClassificationResult {
    let document = Html::parse_document(html);
    classify_document(&document, url)
}

/// Same as [`classify`] over an already parsed document
pub fn classify_document(document: &Html, url: &Url) -> ClassificationResult {
    let title = extract_title(document);
    let heading = extract_heading(document);
    let context = classification_context(url, title.as_deref(), heading.as_deref());

    let gender = detect_gender(&context);
    let categories = infer_categories(&context);

    let kind = if StructuredData::from_document(document).has_product() {
        PageKind::Product
    } else if has_page_param(url) || (gender.is_some() && has_listing_signal(&context)) {
        PageKind::Listing
    } else {
        PageKind::Other
    };

    ClassificationResult {
        gender,
        categories,
        title,
        heading,
        kind,
    }
}

/// URL path and query plus title and heading, joined for keyword matching
fn classification_context(url: &Url, title: Option<&str>, heading: Option<&str>) -> String {
    let mut context = url.path().to_string();
    if let Some(query) = url.query() {
        context.push(' ');
        context.push_str(query);
    }
    for part in [title, heading].into_iter().flatten() {
        context.push(' ');
        context.push_str(part);
    }
    context
}
