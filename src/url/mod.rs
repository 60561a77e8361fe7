//! URL handling module for Catalog-Crawler
//!
//! This module provides the comparison-key normalizer used by the visited
//! ledger and the product merge, plus link resolution helpers.

mod normalize;
mod resolve;

pub use normalize::{normalize_or_raw, normalize_parsed, normalize_url};
pub use resolve::{
    absolutize_src, has_page_param, resolve_link, resolve_seed, same_host, same_host_name,
};
