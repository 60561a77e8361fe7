//! Configuration module for Catalog-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every setting has a default, so a file only needs `[crawler]
//! base-url`; command-line flags override what the file provides.
//!
//! # Example
//!
//! ```no_run
//! use catalog_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawling {} with budget {}", config.crawler.base_url, config.crawler.page_budget);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, OutputFormat};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, load_seed_file};
pub use validation::validate;
