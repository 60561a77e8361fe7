//! Site navigation menu

use std::collections::HashSet;

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use super::document::element_text;
use crate::url::resolve_link;

/// One navigation anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub text: String,
    pub url: String,
}

const MENU_SELECTORS: &[&str] = &["header a[href]", "nav a[href]", "footer a[href]"];

/// Collects anchors from the header, nav and footer regions
///
/// Items are deduplicated on `(text, url)` in document order per region.
/// Anchors without text or with unresolvable hrefs are skipped.
pub fn extract_menu(html: &str, base_url: &Url) -> Vec<MenuItem> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for raw in MENU_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for anchor in document.select(&selector) {
            let text = element_text(&anchor);
            if text.is_empty() {
                continue;
            }
            let Some(url) = anchor
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            else {
                continue;
            };
            let item = MenuItem {
                text,
                url: url.to_string(),
            };
            if seen.insert((item.text.clone(), item.url.clone())) {
                items.push(item);
            }
        }
    }

    items
}
