//! Small text helpers over a parsed HTML document

use scraper::{ElementRef, Html, Node, Selector};

/// Collapses every whitespace run to one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Extracts the page title from the HTML document
pub fn extract_title(document: &Html) -> Option<String> {
    first_text(document, &["title"])
}

/// Extracts the first `h1` heading
pub fn extract_heading(document: &Html) -> Option<String> {
    first_text(document, &["h1"])
}

/// Returns the text of the first element matching any selector, trying the
/// selectors in order and skipping elements with no text
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let found = document
            .select(&selector)
            .map(|element| element_text(&element))
            .find(|text| !text.is_empty());
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Value of `attr` on the first element matching `selector`
pub fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Text a reader would see: every text node outside `script`, `style` and
/// `noscript`, whitespace collapsed
pub fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| {
                parent
                    .value()
                    .as_element()
                    .map(|el| matches!(el.name(), "script" | "style" | "noscript"))
            })
            .unwrap_or(false);
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}
