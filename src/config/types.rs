use crate::page::LISTING_LINK_CAP;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Main configuration structure for Catalog-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Site root; relative seeds and links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Extra seed URLs (absolute or `/`-relative)
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Maximum number of pages fetched by the discovery pass
    #[serde(rename = "page-budget", default = "default_page_budget")]
    pub page_budget: usize,

    /// Maximum new frontier entries contributed by one listing page
    #[serde(rename = "listing-link-cap", default = "default_listing_link_cap")]
    pub listing_link_cap: usize,

    /// Maximum number of URLs collected from sitemaps
    #[serde(rename = "sitemap-limit", default = "default_sitemap_limit")]
    pub sitemap_limit: usize,

    /// Number of product pages fetched concurrently in the detail pass
    #[serde(rename = "detail-concurrency", default = "default_detail_concurrency")]
    pub detail_concurrency: usize,

    /// Ceiling on requests across both passes
    #[serde(rename = "max-requests", default)]
    pub max_requests: Option<usize>,

    /// Wall clock ceiling for the whole crawl (seconds)
    #[serde(rename = "max-duration-secs", default)]
    pub max_duration_secs: Option<u64>,

    /// Add the home page's navigation links to the seeds
    #[serde(rename = "seed-from-menu", default = "default_true")]
    pub seed_from_menu: bool,

    /// Skip URLs disallowed by the site's robots.txt
    #[serde(rename = "respect-robots", default)]
    pub respect_robots: bool,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum time between request starts (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per request, first try included
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(rename = "backoff-initial-ms", default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    #[serde(rename = "backoff-max-ms", default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Destination file; defaults to `data/products.<ext>`
    #[serde(default)]
    pub path: Option<String>,
}

/// Supported output file formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl Config {
    /// Builds a configuration for `base_url` with every other setting defaulted
    pub fn for_site(base_url: &str) -> Self {
        Self {
            crawler: CrawlerConfig::for_site(base_url),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Resolved output path, falling back to `data/products.<ext>`
    pub fn output_path(&self) -> String {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| format!("data/products.{}", self.output.format.extension()))
    }
}

impl CrawlerConfig {
    pub fn for_site(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            seeds: Vec::new(),
            page_budget: default_page_budget(),
            listing_link_cap: default_listing_link_cap(),
            sitemap_limit: default_sitemap_limit(),
            detail_concurrency: default_detail_concurrency(),
            max_requests: None,
            max_duration_secs: None,
            seed_from_menu: true,
            respect_robots: false,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

fn default_page_budget() -> usize {
    1500
}

fn default_listing_link_cap() -> usize {
    LISTING_LINK_CAP
}

fn default_sitemap_limit() -> usize {
    4000
}

fn default_detail_concurrency() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}

fn default_delay_ms() -> u64 {
    1200
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_initial_ms() -> u64 {
    1000
}

fn default_backoff_max_ms() -> u64 {
    16_000
}
