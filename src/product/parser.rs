//! Product page parsing
//!
//! Every field is filled from an ordered list of sources; the first source
//! returning a non-empty value wins. Structured JSON-LD data always comes
//! before markup heuristics.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use super::types::RawProduct;
use crate::page::document::{
    collapse_whitespace, extract_heading, extract_title, first_attr, first_text, visible_text,
};
use crate::page::structured::{text_field, StructuredData};
use crate::page::vocabulary::{contains_phrase, infer_categories, token_text};
use crate::url::{absolutize_src, has_page_param, normalize_parsed};

/// Result of parsing a candidate product page
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(RawProduct),
    /// Page looks like a listing and declares no structured Product
    ListingPage,
    /// Neither a name nor a price could be found
    Incomplete,
}

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product-description",
    "[itemprop='description']",
    "section.description",
    ".description",
];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];
const MAX_FALLBACK_IMAGES: usize = 10;

/// Heading phrases that mark a collection page
const LISTING_HEADING_PHRASES: &[&str] = &[
    "best seller",
    "best sellers",
    "bestseller",
    "bestsellers",
    "new in",
    "men",
    "mens",
    "women",
    "womens",
    "collection",
    "collections",
    "category",
    "categories",
];

/// URL words that mark a collection page
const LISTING_URL_WORDS: &[&str] = &["bestseller", "bestsellers", "sale"];

struct ProductPage<'a> {
    document: &'a Html,
    url: &'a Url,
    product: Option<&'a Value>,
    structured: &'a StructuredData,
}

#[derive(Debug, Clone, PartialEq)]
struct PriceQuote {
    amount: f64,
    currency: Option<String>,
}

type Extractor<T> = fn(&ProductPage<'_>) -> Option<T>;

const NAME_SOURCES: &[Extractor<String>] = &[structured_name, heading_name];
const PRICE_SOURCES: &[Extractor<PriceQuote>] = &[structured_price, text_price];
const CURRENCY_SOURCES: &[Extractor<String>] = &[structured_currency];
const SKU_SOURCES: &[Extractor<String>] = &[structured_sku, itemprop_sku];
const BRAND_SOURCES: &[Extractor<String>] = &[structured_brand, itemprop_brand];
const DESCRIPTION_SOURCES: &[Extractor<String>] = &[structured_description, markup_description];
const IMAGE_SOURCES: &[Extractor<Vec<String>>] = &[structured_images, markup_images];
const CATEGORY_SOURCES: &[Extractor<Vec<String>>] = &[breadcrumb_categories, keyword_categories];

fn first_match<T>(sources: &[Extractor<T>], page: &ProductPage<'_>) -> Option<T> {
    sources.iter().find_map(|source| source(page))
}

/// Parses a product page into a raw record
///
/// Returns `None` when the page is rejected as a listing or when neither a
/// name nor a price is found.
pub fn parse_product(html: &str, url: &str) -> Option<RawProduct> {
    let url = Url::parse(url).ok()?;
    match parse_product_page(html, &url) {
        ParseOutcome::Parsed(record) => Some(record),
        _ => None,
    }
}

/// Parses a product page, reporting why a page produced no record
pub fn parse_product_page(html: &str, url: &Url) -> ParseOutcome {
    let document = Html::parse_document(html);
    let structured = StructuredData::from_document(&document);
    let page = ProductPage {
        document: &document,
        url,
        product: structured.product(),
        structured: &structured,
    };

    if page.product.is_none() && looks_like_listing(&page) {
        return ParseOutcome::ListingPage;
    }

    let quote = first_match(PRICE_SOURCES, &page);
    let currency = first_match(CURRENCY_SOURCES, &page)
        .or_else(|| quote.as_ref().and_then(|q| q.currency.clone()))
        .unwrap_or_default();

    let record = RawProduct {
        url: url.to_string(),
        canonical_url: canonical_url(&page),
        name: first_match(NAME_SOURCES, &page).unwrap_or_default(),
        price: quote.map(|q| q.amount),
        currency,
        sku: first_match(SKU_SOURCES, &page).unwrap_or_default(),
        brand: first_match(BRAND_SOURCES, &page).unwrap_or_default(),
        images: first_match(IMAGE_SOURCES, &page).unwrap_or_default(),
        description: first_match(DESCRIPTION_SOURCES, &page).unwrap_or_default(),
        categories: first_match(CATEGORY_SOURCES, &page).unwrap_or_default(),
    };

    if record.is_valid() {
        ParseOutcome::Parsed(record)
    } else {
        ParseOutcome::Incomplete
    }
}

fn looks_like_listing(page: &ProductPage<'_>) -> bool {
    if has_page_param(page.url) {
        return true;
    }
    let path_tokens = token_text(page.url.path());
    if LISTING_URL_WORDS
        .iter()
        .any(|word| contains_phrase(&path_tokens, word))
    {
        return true;
    }
    match extract_heading(page.document) {
        Some(heading) => {
            let tokens = token_text(&heading);
            LISTING_HEADING_PHRASES
                .iter()
                .any(|phrase| contains_phrase(&tokens, phrase))
        }
        None => false,
    }
}

/// `link[rel=canonical]`, then `og:url`, then scheme, host and path of the page URL
fn canonical_url(page: &ProductPage<'_>) -> String {
    let declared = first_attr(page.document, "link[rel='canonical']", "href")
        .or_else(|| first_attr(page.document, "meta[property='og:url']", "content"));

    match declared {
        Some(href) => page
            .url
            .join(&href)
            .map(|u| u.to_string())
            .unwrap_or(href),
        None => normalize_parsed(page.url).unwrap_or_else(|_| page.url.to_string()),
    }
}

// ===== Name =====

fn structured_name(page: &ProductPage<'_>) -> Option<String> {
    text_field(page.product?, "name")
}

fn heading_name(page: &ProductPage<'_>) -> Option<String> {
    extract_heading(page.document)
}

// ===== Price and currency =====

fn first_offer(product: &Value) -> Option<&Value> {
    match product.get("offers")? {
        Value::Array(offers) => offers.first(),
        offer => Some(offer),
    }
}

fn structured_price(page: &ProductPage<'_>) -> Option<PriceQuote> {
    let offer = first_offer(page.product?)?;
    let raw = offer.get("price").or_else(|| offer.get("lowPrice"))?;
    match raw {
        Value::Number(n) => n.as_f64().map(|amount| PriceQuote {
            amount,
            currency: None,
        }),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

fn structured_currency(page: &ProductPage<'_>) -> Option<String> {
    let offer = first_offer(page.product?)?;
    text_field(offer, "priceCurrency").map(|c| c.to_uppercase())
}

fn price_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"([$€£¥])\s*(\d[\d.,]*)").ok())
        .as_ref()
}

/// Scans the visible text for a currency symbol followed by an amount
fn text_price(page: &ProductPage<'_>) -> Option<PriceQuote> {
    let text = visible_text(page.document);
    let captures = price_pattern()?.captures(&text)?;
    let symbol = captures.get(1)?.as_str();
    let amount = captures.get(2)?.as_str();
    let mut quote = parse_price_text(amount)?;
    quote.currency = symbol_currency(symbol);
    Some(quote)
}

fn symbol_currency(text: &str) -> Option<String> {
    let code = if text.contains('$') {
        "USD"
    } else if text.contains('€') {
        "EUR"
    } else if text.contains('£') {
        "GBP"
    } else if text.contains('¥') {
        "CNY"
    } else {
        return None;
    };
    Some(code.to_string())
}

/// Keeps digits and separators and parses the rest
///
/// Commas are thousands separators, except a lone trailing `,dd` group with
/// no dot anywhere, which is a decimal comma (`149,95`).
fn parse_price_text(text: &str) -> Option<PriceQuote> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let kept = kept.trim_end_matches(['.', ',']);
    let numeric = match kept.rfind(',') {
        Some(pos) if !kept.contains('.') && kept.len() - pos - 1 == 2 => {
            format!("{}.{}", kept[..pos].replace(',', ""), &kept[pos + 1..])
        }
        _ => kept.replace(',', ""),
    };
    let amount = numeric.parse::<f64>().ok()?;
    Some(PriceQuote {
        amount,
        currency: symbol_currency(text),
    })
}

// ===== Identity =====

fn structured_sku(page: &ProductPage<'_>) -> Option<String> {
    text_field(page.product?, "sku")
}

fn itemprop_sku(page: &ProductPage<'_>) -> Option<String> {
    first_attr(page.document, "[itemprop='sku']", "content")
        .or_else(|| first_text(page.document, &["[itemprop='sku']"]))
}

fn structured_brand(page: &ProductPage<'_>) -> Option<String> {
    let product = page.product?;
    match product.get("brand")? {
        Value::Object(_) => text_field(product.get("brand")?, "name"),
        _ => text_field(product, "brand"),
    }
}

fn itemprop_brand(page: &ProductPage<'_>) -> Option<String> {
    first_attr(page.document, "[itemprop='brand']", "content")
        .or_else(|| first_text(page.document, &["[itemprop='brand']"]))
}

// ===== Description =====

fn structured_description(page: &ProductPage<'_>) -> Option<String> {
    text_field(page.product?, "description")
}

fn markup_description(page: &ProductPage<'_>) -> Option<String> {
    first_text(page.document, DESCRIPTION_SELECTORS)
}

// ===== Images =====

fn structured_images(page: &ProductPage<'_>) -> Option<Vec<String>> {
    let mut sources = Vec::new();
    collect_image_sources(page.product?.get("image")?, &mut sources);
    absolutize_images(sources.iter().map(String::as_str), page.url)
}

fn collect_image_sources(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_image_sources(item, out)),
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get("url").or_else(|| map.get("contentUrl")) {
                out.push(s.clone());
            }
        }
        _ => {}
    }
}

fn markup_images(page: &ProductPage<'_>) -> Option<Vec<String>> {
    let selector = Selector::parse("img[src]").ok()?;
    let sources: Vec<&str> = page
        .document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| {
            let lowered = src.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| lowered.contains(ext))
        })
        .take(MAX_FALLBACK_IMAGES)
        .collect();
    absolutize_images(sources.into_iter(), page.url)
}

/// Absolutizes image sources, dropping duplicates; `None` if nothing is left
fn absolutize_images<'s>(sources: impl Iterator<Item = &'s str>, page_url: &Url) -> Option<Vec<String>> {
    let mut images: Vec<String> = Vec::new();
    for src in sources {
        if let Some(absolute) = absolutize_src(src, page_url) {
            if !images.contains(&absolute) {
                images.push(absolute);
            }
        }
    }
    (!images.is_empty()).then_some(images)
}

// ===== Categories =====

fn breadcrumb_categories(page: &ProductPage<'_>) -> Option<Vec<String>> {
    let crumbs = page.structured.breadcrumbs();
    (!crumbs.is_empty()).then_some(crumbs)
}

fn keyword_categories(page: &ProductPage<'_>) -> Option<Vec<String>> {
    let mut context = page.url.path().to_string();
    for part in [extract_title(page.document), extract_heading(page.document)]
        .into_iter()
        .flatten()
    {
        context.push(' ');
        context.push_str(&collapse_whitespace(&part));
    }
    let categories = infer_categories(&context);
    (!categories.is_empty()).then_some(categories)
}
