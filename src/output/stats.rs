//! Crawl statistics
//!
//! Counters filled in by the coordinator while it runs, printed by the CLI
//! once the catalog is written.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Crawl statistics summary
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Requests issued for sitemap documents and robots.txt
    pub auxiliary_requests: u64,

    /// Discovery pages fetched successfully
    pub pages_fetched: u64,

    /// Discovery pages whose fetch failed
    pub pages_failed: u64,

    /// URLs skipped by the robots gate
    pub pages_disallowed: u64,

    /// Fetched pages classified as listings
    pub listing_pages: u64,

    /// Fetched pages declaring a structured Product during discovery
    pub product_pages_seen: u64,

    /// Distinct candidate product URLs harvested from listings
    pub candidates: u64,

    /// Candidates dropped because they turned out to be listings
    pub candidates_pruned: u64,

    /// Product pages fetched in the detail pass
    pub products_fetched: u64,

    /// Product pages parsed from a body discovery already fetched
    pub products_reused: u64,

    /// Product pages whose fetch failed
    pub product_fetch_failures: u64,

    /// Product pages that produced no record
    pub parse_rejections: u64,

    /// Products in the final catalog
    pub products: u64,

    /// Set when a request ceiling or deadline ended the crawl early
    pub stopped_early: bool,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            auxiliary_requests: 0,
            pages_fetched: 0,
            pages_failed: 0,
            pages_disallowed: 0,
            listing_pages: 0,
            product_pages_seen: 0,
            candidates: 0,
            candidates_pruned: 0,
            products_fetched: 0,
            products_reused: 0,
            product_fetch_failures: 0,
            parse_rejections: 0,
            products: 0,
            stopped_early: false,
        }
    }

    /// Pages charged against the discovery budget
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.pages_failed
    }

    /// All requests issued, both passes and auxiliary fetches included
    pub fn total_requests(&self) -> u64 {
        self.auxiliary_requests
            + self.pages_attempted()
            + self.products_fetched
            + self.product_fetch_failures
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Discovery:");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Pages failed: {}", stats.pages_failed);
    if stats.pages_disallowed > 0 {
        println!("  Disallowed by robots.txt: {}", stats.pages_disallowed);
    }
    println!("  Listing pages: {}", stats.listing_pages);
    println!("  Product pages seen: {}", stats.product_pages_seen);
    println!();

    println!("Products:");
    println!("  Candidates: {}", stats.candidates);
    println!("  Pruned as listings: {}", stats.candidates_pruned);
    println!("  Fetched: {}", stats.products_fetched);
    println!("  Reused from discovery: {}", stats.products_reused);
    println!("  Fetch failures: {}", stats.product_fetch_failures);
    println!("  Parse rejections: {}", stats.parse_rejections);
    println!("  In catalog: {}", stats.products);
    println!();

    println!("Total requests: {}", stats.total_requests());
    if let Some(seconds) = stats.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    if stats.stopped_early {
        println!("Stopped early: request ceiling or deadline reached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_totals() {
        let stats = CrawlStatistics {
            auxiliary_requests: 1,
            pages_fetched: 8,
            pages_failed: 2,
            products_fetched: 5,
            products_reused: 3,
            product_fetch_failures: 1,
            ..CrawlStatistics::new()
        };
        assert_eq!(stats.pages_attempted(), 10);
        assert_eq!(stats.total_requests(), 17);
    }

    #[test]
    fn test_finish_sets_duration() {
        let mut stats = CrawlStatistics::new();
        assert_eq!(stats.duration_seconds(), None);
        stats.finish();
        assert!(stats.duration_seconds().unwrap() >= 0);
    }
}
