//! Product records
//!
//! Parsing of product pages into raw records and the merge that folds
//! repeated observations into one product per canonical key.

mod merge;
mod parser;
mod types;

pub use merge::{canonical_key, clean_categories, dedup_provenance, merge_products, summarize_gender};
pub use parser::{parse_product, parse_product_page, ParseOutcome};
pub use types::{GenderSummary, Product, ProductObservation, Provenance, RawProduct};
