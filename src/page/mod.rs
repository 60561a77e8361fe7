//! Page understanding
//!
//! This module turns fetched markup into crawl decisions:
//! - Classification into product, listing or other pages
//! - Gender and category signals
//! - Product and listing link harvesting
//! - JSON-LD structured data
//! - The site navigation menu

mod classifier;
pub mod document;
mod links;
mod menu;
pub mod structured;
pub mod vocabulary;

pub use classifier::{classify, classify_document, ClassificationResult, PageKind};
pub use links::{
    extract_listing_links, extract_product_links, is_listing_url, listing_links, product_links,
    LISTING_LINK_CAP,
};
pub use menu::{extract_menu, MenuItem};
pub use structured::StructuredData;
pub use vocabulary::{detect_gender, infer_categories, Gender};
