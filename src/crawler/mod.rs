//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The `Transport` seam and its reqwest implementation with pacing and retries
//! - The breadth-first frontier
//! - Sitemap discovery for single-seed crawls
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
#[cfg(test)]
mod mock_transport;
mod sitemap;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchedPage, HttpTransport, Pacer, RetryPolicy, Transport};
pub use frontier::Frontier;
#[cfg(test)]
pub use mock_transport::MockTransport;
pub use sitemap::{discover_sitemap_urls, parse_sitemap, SitemapDiscovery, SitemapEntries};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::page::{extract_menu, is_listing_url, MenuItem};
use crate::product::Product;
use crate::{CatalogError, TransportError};
use tracing::{info, warn};
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub menu: Vec<MenuItem>,
    pub products: Vec<Product>,
    pub statistics: CrawlStatistics,
}

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP transport from the `[http]` settings
/// 2. Read the site menu from the home page
/// 3. Discover listing pages breadth-first and collect product candidates
/// 4. Fetch every candidate and merge the records
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Menu, merged products and statistics
/// * `Err(CatalogError)` - The crawl could not start
pub async fn crawl(config: &Config) -> Result<CrawlOutcome, CatalogError> {
    let transport = HttpTransport::new(&config.http)?;
    crawl_with(config, &transport).await
}

/// Runs a complete crawl over the given transport
pub async fn crawl_with<T: Transport + ?Sized>(
    config: &Config,
    transport: &T,
) -> Result<CrawlOutcome, CatalogError> {
    let base_url = Url::parse(&config.crawler.base_url)?;
    let mut coordinator = Coordinator::new(config, transport)?;

    let (menu, home) = crawl_menu(transport, &base_url).await;
    coordinator.provide_page(base_url.as_str(), home);

    let mut seeds = vec![base_url.to_string()];
    if config.crawler.seed_from_menu {
        seeds.extend(menu_seeds(&menu, &base_url));
    }
    seeds.extend(config.crawler.seeds.iter().cloned());

    let products = coordinator.run(&seeds).await?;
    Ok(CrawlOutcome {
        menu,
        products,
        statistics: coordinator.into_statistics(),
    })
}

/// Fetches the home page and reads its navigation menu
///
/// A failed fetch yields an empty menu. The fetch result is returned as well
/// so discovery can start from it without requesting the home page again.
pub async fn crawl_menu<T: Transport + ?Sized>(
    transport: &T,
    base_url: &Url,
) -> (Vec<MenuItem>, Result<FetchedPage, TransportError>) {
    let home = transport.fetch(base_url.as_str()).await;
    let menu = match &home {
        Ok(page) => {
            let menu = extract_menu(&page.body, base_url);
            info!("Read {} menu items from {}", menu.len(), base_url);
            menu
        }
        Err(e) => {
            warn!("Could not read the menu from {}: {}", base_url, e);
            Vec::new()
        }
    };
    (menu, home)
}

/// Menu URLs worth seeding discovery with
fn menu_seeds(menu: &[MenuItem], base_url: &Url) -> Vec<String> {
    menu.iter()
        .filter_map(|item| Url::parse(&item.url).ok())
        .filter(|url| is_listing_url(url, base_url))
        .map(|url| url.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://shop.example.com/";

    #[tokio::test]
    async fn test_crawl_menu_failure_is_empty() {
        let transport = MockTransport::new();
        let base = Url::parse(BASE).unwrap();
        let (menu, home) = crawl_menu(&transport, &base).await;
        assert!(menu.is_empty());
        assert!(home.is_err());
    }

    #[tokio::test]
    async fn test_menu_seeds_feed_discovery() {
        let home = r#"<html><head><title>Isee</title></head><body>
            <nav><a href="/women-hoodies">Women</a><a href="/account">Account</a>
            <a href="https://elsewhere.example.com/men">Partner</a></nav></body></html>"#;
        let hoodies = r#"<html><head><title>Women Hoodies</title></head><body>
            <a href="/isee-grey-hoodie">Grey</a></body></html>"#;
        let product = r#"<html><head><script type="application/ld+json">
            {"@type":"Product","name":"Grey Hoodie","offers":{"price":"59.00"}}
            </script></head><body></body></html>"#;
        let transport = MockTransport::new()
            .page(BASE, home)
            .page("https://shop.example.com/women-hoodies", hoodies)
            .page("https://shop.example.com/isee-grey-hoodie", product);

        let config = Config::for_site(BASE);
        let outcome = crawl_with(&config, &transport).await.unwrap();

        assert_eq!(outcome.menu.len(), 3);
        assert_eq!(outcome.products.len(), 1);
        assert_eq!(outcome.products[0].name, "Grey Hoodie");
        assert_eq!(outcome.products[0].categories, vec!["hoodies".to_string()]);
        assert_eq!(transport.request_count("https://shop.example.com/account"), 0);
        assert_eq!(transport.request_count("https://elsewhere.example.com/men"), 0);
        assert_eq!(transport.request_count(BASE), 1);
        assert_eq!(transport.request_count("https://shop.example.com/isee-grey-hoodie"), 1);
        // Two seeds, so no sitemap lookup
        assert_eq!(transport.request_count("https://shop.example.com/sitemap.xml"), 0);
    }

    #[tokio::test]
    async fn test_failed_home_page_is_not_requested_again() {
        let transport = MockTransport::new().status(BASE, 503);

        let mut config = Config::for_site(BASE);
        config.crawler.seeds = vec!["/men-hoodies".to_string()];
        let outcome = crawl_with(&config, &transport).await.unwrap();

        assert!(outcome.menu.is_empty());
        assert!(outcome.products.is_empty());
        assert_eq!(transport.request_count(BASE), 1);
        assert_eq!(outcome.statistics.pages_failed, 2);
    }
}
