//! Sitemap seeding
//!
//! Walks `/sitemap.xml` (and any sitemap indexes it points to) and keeps
//! same-host URLs that look product-relevant. Failures are logged and
//! skipped; a site without a sitemap simply yields no extra seeds.

use std::collections::{HashSet, VecDeque};

use quick_xml::de::from_str;
use quick_xml::errors::serialize::DeError;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::fetcher::Transport;
use crate::page::vocabulary::is_product_relevant;
use crate::url::same_host_name;

/// Upper bound on sitemap documents fetched in one discovery
const MAX_SITEMAP_FILES: usize = 64;

/// A `<urlset>` or `<sitemapindex>` document
#[derive(Debug, Default, Deserialize)]
struct SitemapDocument {
    #[serde(rename = "url", default)]
    urls: Vec<Location>,
    #[serde(rename = "sitemap", default)]
    sitemaps: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    loc: String,
}

/// Entries of one sitemap document
#[derive(Debug, Default, PartialEq)]
pub struct SitemapEntries {
    /// Page URLs from a `<urlset>`
    pub pages: Vec<String>,
    /// Nested sitemap URLs from a `<sitemapindex>`
    pub sitemaps: Vec<String>,
}

/// Parses a sitemap or sitemap index
pub fn parse_sitemap(xml: &str) -> Result<SitemapEntries, DeError> {
    let document: SitemapDocument = from_str(xml)?;
    let clean = |locations: Vec<Location>| {
        locations
            .into_iter()
            .map(|l| l.loc.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    };
    Ok(SitemapEntries {
        pages: clean(document.urls),
        sitemaps: clean(document.sitemaps),
    })
}

/// Result of walking the sitemaps of a site
#[derive(Debug, Default)]
pub struct SitemapDiscovery {
    pub urls: Vec<String>,
    pub documents_fetched: usize,
}

/// Collects product-relevant, same-host URLs from the site's sitemaps
///
/// # Arguments
///
/// * `transport` - Transport used for the sitemap requests
/// * `base_url` - Site root; `/sitemap.xml` is resolved against it
/// * `extra_sources` - Further sitemap URLs, e.g. from robots.txt
/// * `limit` - Maximum number of URLs returned
pub async fn discover_sitemap_urls<T: Transport + ?Sized>(
    transport: &T,
    base_url: &Url,
    extra_sources: &[String],
    limit: usize,
) -> SitemapDiscovery {
    let mut discovery = SitemapDiscovery::default();
    let mut queue: VecDeque<String> = base_url
        .join("/sitemap.xml")
        .map(|u| u.to_string())
        .into_iter()
        .chain(extra_sources.iter().cloned())
        .collect();
    let mut seen_documents = HashSet::new();
    let mut seen_urls = HashSet::new();

    while let Some(sitemap_url) = queue.pop_front() {
        if discovery.urls.len() >= limit || discovery.documents_fetched >= MAX_SITEMAP_FILES {
            break;
        }
        if !seen_documents.insert(sitemap_url.clone()) {
            continue;
        }

        discovery.documents_fetched += 1;
        let body = match transport.fetch(&sitemap_url).await {
            Ok(page) => page.body,
            Err(e) => {
                debug!("No sitemap at {}: {}", sitemap_url, e);
                continue;
            }
        };
        let entries = match parse_sitemap(&body) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Unreadable sitemap {}: {}", sitemap_url, e);
                continue;
            }
        };

        queue.extend(entries.sitemaps);

        for loc in entries.pages {
            if discovery.urls.len() >= limit {
                break;
            }
            let Ok(url) = Url::parse(&loc) else { continue };
            if !same_host_name(&url, base_url) || !is_product_relevant(&loc) {
                continue;
            }
            if seen_urls.insert(loc.clone()) {
                discovery.urls.push(loc);
            }
        }
    }

    if !discovery.urls.is_empty() {
        info!(
            "Sitemaps yielded {} seed URLs from {} documents",
            discovery.urls.len(),
            discovery.documents_fetched
        );
    }
    discovery
}
