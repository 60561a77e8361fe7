//! Link harvesting from listing pages
//!
//! Product links are single-segment, hyphenated slugs on the crawl host
//! (`/isee-red-jacket`). Listing links are same-host anchors that look like
//! pagination or name a gender or category.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use super::vocabulary::{has_gender_token, has_listing_signal};
use crate::url::{has_page_param, resolve_link, same_host};

/// Per-page cap on listing links fed back into the frontier
pub const LISTING_LINK_CAP: usize = 50;

/// Substrings that disqualify an href as a product link
const PRODUCT_LINK_DENY: &[&str] = &[
    "account",
    "cart",
    "search",
    "help",
    "login",
    "bestsellers",
    "new-in",
    "sale",
    "page=",
    "/blog",
    "/travel",
];

/// Substrings that disqualify an href as a listing link
const LISTING_LINK_DENY: &[&str] = &["account", "cart", "login", "help", "search", "blog", "travel"];

fn anchors(document: &Html) -> Vec<&str> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .collect()
}

/// Deny-list check over the path and query, never the host
fn denied(url: &Url, deny: &[&str]) -> bool {
    let mut target = url.path().to_lowercase();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(&query.to_lowercase());
    }
    deny.iter().any(|token| target.contains(token))
}

/// Extracts candidate product links from listing markup
///
/// # Arguments
///
/// * `html` - Listing page markup
/// * `base_url` - URL of the listing page, used to resolve relative hrefs
///
/// # Returns
///
/// Absolute, same-host product URLs in document order, without duplicates
pub fn extract_product_links(html: &str, base_url: &Url) -> Vec<String> {
    product_links(&Html::parse_document(html), base_url)
}

/// Same as [`extract_product_links`] over a parsed document
pub fn product_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in anchors(document) {
        let href = href.trim();
        if href.contains('?') || href.contains('#') {
            continue;
        }
        let Some(resolved) = resolve_link(href, base_url) else {
            continue;
        };
        if !same_host(&resolved, base_url)
            || denied(&resolved, PRODUCT_LINK_DENY)
            || !is_product_slug(resolved.path())
        {
            continue;
        }
        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

/// A single path segment containing a hyphen: `/isee-red-jacket`
fn is_product_slug(path: &str) -> bool {
    path.matches('/').count() == 1 && path.len() > 1 && path.contains('-')
}

/// Returns true if `url` is a same-host page worth expanding as a listing:
/// paginated, or naming a gender, a category or a collection
pub fn is_listing_url(url: &Url, base_url: &Url) -> bool {
    if !same_host(url, base_url) || denied(url, LISTING_LINK_DENY) {
        return false;
    }
    let path = url.path();
    has_page_param(url) || has_gender_token(path) || has_listing_signal(path)
}

/// Extracts listing links from listing markup, capped at `cap`
///
/// Links are deduplicated before the cap is applied.
pub fn extract_listing_links(html: &str, base_url: &Url, cap: usize) -> Vec<String> {
    listing_links(&Html::parse_document(html), base_url, cap)
}

/// Same as [`extract_listing_links`] over a parsed document
pub fn listing_links(document: &Html, base_url: &Url, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in anchors(document) {
        if links.len() >= cap {
            break;
        }
        let Some(resolved) = resolve_link(href, base_url) else {
            continue;
        };
        if !is_listing_url(&resolved, base_url) {
            continue;
        }

        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
