//! Catalog-Crawler: a product discovery crawler for commerce sites
//!
//! This crate explores a shop's listing pages breadth-first, collects the
//! product pages they link to, parses each product, and merges repeated
//! observations of the same product into one record that remembers which
//! gender/category listings it was found under.

pub mod config;
pub mod crawler;
pub mod output;
pub mod page;
pub mod product;
pub mod robots;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Catalog-Crawler operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid state transition for {url}: {from:?} -> {to:?}")]
    InvalidTransition {
        url: String,
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Seed file {path} could not be read: {source}")]
    MissingSeedFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Failures of the HTTP transport, raised after retries are exhausted
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl TransportError {
    /// Returns true if another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Body { .. } => false,
        }
    }
}

/// Result type alias for Catalog-Crawler operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOutcome};
pub use page::{classify, ClassificationResult, Gender, PageKind};
pub use product::{merge_products, parse_product, Product, RawProduct};
pub use state::PageState;
pub use url::normalize_url;
