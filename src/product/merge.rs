//! Product merge
//!
//! Observations are grouped by canonical key. The first observation of a key
//! becomes the base record; later observations only fill fields the base
//! left empty and contribute their provenance.

use std::collections::{HashMap, HashSet};

use super::types::{GenderSummary, Product, ProductObservation, Provenance, RawProduct};
use crate::page::vocabulary::is_collection_label;
use crate::page::Gender;
use crate::url::normalize_or_raw;

/// Canonical key of a record: its normalized canonical URL, or its normalized
/// URL when no canonical is declared
pub fn canonical_key(record: &RawProduct) -> String {
    if record.canonical_url.trim().is_empty() {
        normalize_or_raw(&record.url)
    } else {
        normalize_or_raw(&record.canonical_url)
    }
}

struct MergeGroup {
    record: RawProduct,
    provenance: Vec<Provenance>,
}

/// Merges observations into one product per canonical key
///
/// Output order follows the first appearance of each key.
pub fn merge_products(observations: impl IntoIterator<Item = ProductObservation>) -> Vec<Product> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, MergeGroup> = HashMap::new();

    for observation in observations {
        if !observation.record.is_valid() {
            continue;
        }
        let key = canonical_key(&observation.record);
        match groups.get_mut(&key) {
            Some(group) => {
                fill_missing(&mut group.record, observation.record);
                group.provenance.extend(observation.provenance);
            }
            None => {
                order.push(key.clone());
                groups.insert(
                    key,
                    MergeGroup {
                        record: observation.record,
                        provenance: observation.provenance,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(finish_group)
        .collect()
}

fn fill_missing(base: &mut RawProduct, later: RawProduct) {
    fill_text(&mut base.canonical_url, later.canonical_url);
    fill_text(&mut base.name, later.name);
    fill_text(&mut base.currency, later.currency);
    fill_text(&mut base.sku, later.sku);
    fill_text(&mut base.brand, later.brand);
    fill_text(&mut base.description, later.description);
    if base.price.is_none() {
        base.price = later.price;
    }
    if base.images.is_empty() {
        base.images = later.images;
    }
    if base.categories.is_empty() {
        base.categories = later.categories;
    }
}

fn fill_text(base: &mut String, later: String) {
    if base.trim().is_empty() {
        *base = later;
    }
}

fn finish_group(group: MergeGroup) -> Product {
    let found_in = dedup_provenance(group.provenance);
    let gender = summarize_gender(&found_in);
    let categories = clean_categories(&group.record.categories, &found_in);
    let record = group.record;

    Product {
        url: record.url,
        canonical_url: record.canonical_url,
        name: record.name,
        price: record.price,
        currency: record.currency,
        sku: record.sku,
        brand: record.brand,
        images: record.images,
        description: record.description,
        gender,
        categories,
        found_in,
    }
}

/// Drops repeated `(gender, category, source_url)` tuples, keeping first appearances
pub fn dedup_provenance(provenance: Vec<Provenance>) -> Vec<Provenance> {
    let mut seen = HashSet::new();
    provenance
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Derives the audience of a product from its deduplicated provenance
pub fn summarize_gender(found_in: &[Provenance]) -> GenderSummary {
    let men = found_in
        .iter()
        .filter(|p| p.gender == Some(Gender::Men))
        .count();
    let women = found_in
        .iter()
        .filter(|p| p.gender == Some(Gender::Women))
        .count();

    match (men > 0, women > 0) {
        (true, true) => GenderSummary::Both,
        (true, false) => GenderSummary::Men,
        (false, true) => GenderSummary::Women,
        (false, false) => GenderSummary::Unknown,
    }
}

/// Union of the record's own categories and provenance categories
///
/// Trimmed, collection labels removed, case-sensitive dedup in order of first
/// appearance.
pub fn clean_categories(own: &[String], found_in: &[Provenance]) -> Vec<String> {
    let provenance_categories = found_in.iter().filter_map(|p| p.category.as_deref());
    let mut categories: Vec<String> = Vec::new();

    for label in own.iter().map(String::as_str).chain(provenance_categories) {
        let label = label.trim();
        if label.is_empty() || is_collection_label(label) {
            continue;
        }
        if !categories.iter().any(|c| c == label) {
            categories.push(label.to_string());
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, name: &str) -> RawProduct {
        RawProduct {
            url: url.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn prov(gender: Option<Gender>, category: Option<&str>, source: &str) -> Provenance {
        Provenance::new(gender, category.map(String::from), source)
    }

    fn observe(record: RawProduct, provenance: Vec<Provenance>) -> ProductObservation {
        ProductObservation { record, provenance }
    }

    #[test]
    fn test_canonical_key_prefers_canonical_url() {
        let mut r = record("https://shop.example.com/red-jacket?variant=2", "Red");
        assert_eq!(canonical_key(&r), "https://shop.example.com/red-jacket");

        r.canonical_url = "https://SHOP.example.com/isee-red-jacket#x".to_string();
        assert_eq!(canonical_key(&r), "https://shop.example.com/isee-red-jacket");
    }

    #[test]
    fn test_first_writer_wins() {
        let mut first = record("https://s.com/red-jacket", "Red Jacket");
        first.price = None;
        let mut second = record("https://s.com/red-jacket?ref=sale", "Red Jacket (Sale)");
        second.price = Some(59.0);
        second.brand = "Isee".to_string();

        let merged = merge_products(vec![observe(first, vec![]), observe(second, vec![])]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Red Jacket");
        assert_eq!(merged[0].url, "https://s.com/red-jacket");
        assert_eq!(merged[0].price, Some(59.0));
        assert_eq!(merged[0].brand, "Isee");
    }

    #[test]
    fn test_provenance_dedup_counts_distinct_tuples() {
        let raw = vec![
            prov(Some(Gender::Men), Some("jackets"), "https://s.com/men-jackets"),
            prov(Some(Gender::Men), Some("jackets"), "https://s.com/men-jackets"),
            prov(Some(Gender::Men), None, "https://s.com/men-jackets"),
            prov(Some(Gender::Women), Some("jackets"), "https://s.com/men-jackets"),
            prov(Some(Gender::Men), Some("jackets"), "https://s.com/men-jackets?page=2"),
            prov(Some(Gender::Men), None, "https://s.com/men-jackets"),
        ];
        let deduped = dedup_provenance(raw.clone());
        assert_eq!(deduped.len(), 4);
        assert_eq!(deduped[0], raw[0]);
        assert_eq!(deduped[1], raw[2]);
    }

    #[test]
    fn test_gender_aggregation() {
        let men = prov(Some(Gender::Men), None, "a");
        let women = prov(Some(Gender::Women), None, "b");
        let none = prov(None, None, "c");

        assert_eq!(summarize_gender(&[men.clone()]), GenderSummary::Men);
        assert_eq!(summarize_gender(&[women.clone(), none.clone()]), GenderSummary::Women);
        assert_eq!(summarize_gender(&[men, women]), GenderSummary::Both);
        assert_eq!(summarize_gender(&[none]), GenderSummary::Unknown);
        assert_eq!(summarize_gender(&[]), GenderSummary::Unknown);
    }

    #[test]
    fn test_clean_categories() {
        let own = vec![" Jackets ".to_string(), "Home".to_string(), "jackets".to_string()];
        let found_in = vec![
            prov(None, Some("jackets"), "a"),
            prov(None, Some("sale"), "b"),
            prov(None, Some("bestsellers"), "c"),
            prov(None, None, "d"),
            prov(None, Some("pants"), "e"),
        ];
        assert_eq!(
            clean_categories(&own, &found_in),
            vec!["Jackets", "jackets", "pants"]
        );
    }

    #[test]
    fn test_merge_collects_provenance_across_observations() {
        let a = observe(
            record("https://s.com/red-jacket", "Red"),
            vec![prov(Some(Gender::Men), Some("jackets"), "https://s.com/men-jackets")],
        );
        let mut redundant = record("https://s.com/red-jacket-2", "Red");
        redundant.canonical_url = "https://s.com/red-jacket".to_string();
        let b = observe(
            redundant,
            vec![
                prov(Some(Gender::Women), Some("jackets"), "https://s.com/women-jackets"),
                prov(Some(Gender::Men), Some("jackets"), "https://s.com/men-jackets"),
            ],
        );

        let merged = merge_products(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].found_in.len(), 2);
        assert_eq!(merged[0].gender, GenderSummary::Both);
        assert_eq!(merged[0].categories, vec!["jackets"]);
    }

    #[test]
    fn test_invalid_records_dropped_and_order_kept() {
        let merged = merge_products(vec![
            observe(record("https://s.com/b-jacket", "B"), vec![]),
            observe(record("https://s.com/empty-page", ""), vec![]),
            observe(record("https://s.com/a-jacket", "A"), vec![]),
        ]);
        let names: Vec<_> = merged.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
