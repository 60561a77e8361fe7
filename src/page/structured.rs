//! JSON-LD structured data embedded in `<script type="application/ld+json">`
//!
//! A typed object may sit at the top of a block, inside a top-level array, or
//! one level down inside a `@graph` container. `@type` may be a string or a
//! list of strings and is compared case-insensitively. Blocks that are not
//! valid JSON are skipped.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::document::collapse_whitespace;
use super::vocabulary::is_collection_label;

/// All JSON-LD blocks of a page, parsed
#[derive(Debug, Clone, Default)]
pub struct StructuredData {
    blocks: Vec<Value>,
}

impl StructuredData {
    /// Parses every JSON-LD script block in the document
    pub fn from_document(document: &Html) -> Self {
        let mut blocks = Vec::new();
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return Self { blocks };
        };

        for script in document.select(&selector) {
            let raw = script.text().collect::<String>();
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => blocks.push(value),
                Err(e) => debug!("Skipping malformed JSON-LD block: {}", e),
            }
        }

        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// First object declaring `@type` Product
    pub fn product(&self) -> Option<&Value> {
        self.find_typed("product")
    }

    /// Returns true if a Product object is declared anywhere on the page
    pub fn has_product(&self) -> bool {
        self.product().is_some()
    }

    /// Breadcrumb labels from a BreadcrumbList, with navigation and collection
    /// labels such as "Home" or "Sale" removed
    pub fn breadcrumbs(&self) -> Vec<String> {
        let Some(list) = self.find_typed("breadcrumblist") else {
            return Vec::new();
        };
        let Some(elements) = list.get("itemListElement").and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut labels: Vec<String> = Vec::new();
        for element in elements {
            let name = element
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| {
                    element
                        .get("item")
                        .and_then(|item| item.get("name"))
                        .and_then(Value::as_str)
                });
            let Some(name) = name else { continue };
            let label = collapse_whitespace(name);
            if label.is_empty() || is_collection_label(&label) || labels.contains(&label) {
                continue;
            }
            labels.push(label);
        }
        labels
    }

    fn find_typed(&self, wanted: &str) -> Option<&Value> {
        self.blocks
            .iter()
            .flat_map(top_level_objects)
            .find_map(|object| {
                if type_matches(object, wanted) {
                    return Some(object);
                }
                object
                    .get("@graph")
                    .and_then(Value::as_array)
                    .and_then(|graph| graph.iter().find(|node| type_matches(node, wanted)))
            })
    }
}

fn top_level_objects(block: &Value) -> Vec<&Value> {
    match block {
        Value::Array(items) => items.iter().filter(|v| v.is_object()).collect(),
        Value::Object(_) => vec![block],
        _ => Vec::new(),
    }
}

fn type_matches(object: &Value, wanted: &str) -> bool {
    match object.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(wanted),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case(wanted)),
        _ => false,
    }
}

/// Reads a field as trimmed, non-empty text; numbers are formatted
pub fn text_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => {
            let s = collapse_whitespace(s);
            (!s.is_empty()).then_some(s)
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
