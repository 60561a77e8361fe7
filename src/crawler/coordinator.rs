//! Crawler coordinator - discovery and detail orchestration
//!
//! This module owns every piece of mutable crawl state:
//! - Seeding the frontier, with sitemap supplementation for single-seed crawls
//! - The breadth-first discovery pass over listing pages
//! - The candidate product map and the provenance recorded for each candidate
//! - The detail pass that fetches and parses every surviving candidate
//!
//! Discovery is strictly sequential and FIFO. The detail pass may run several
//! fetches at once, but it only reads the finalized candidate map and merges
//! its results after every fetch has finished. A candidate discovery already
//! requested is never requested again: its kept body is parsed instead, or it
//! is skipped if that request failed.

use super::fetcher::{FetchedPage, Transport};
use super::frontier::Frontier;
use super::sitemap::discover_sitemap_urls;
use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::page::{classify_document, listing_links, product_links, ClassificationResult};
use crate::product::{
    canonical_key, merge_products, parse_product_page, ParseOutcome, Product, ProductObservation,
    Provenance, RawProduct,
};
use crate::robots::{fetch_robots, is_allowed, ParsedRobots};
use crate::state::PageState;
use crate::url::{normalize_or_raw, resolve_seed};
use crate::{CatalogError, TransportError};
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// What one discovery page contributed
struct PageScan {
    classification: ClassificationResult,
    product_links: Vec<String>,
    listing_links: Vec<String>,
}

/// A non-listing page requested during discovery
enum DiscoveredPage {
    Fetched(FetchedPage),
    Failed,
}

/// Result of one detail-pass candidate
enum DetailOutcome {
    Fetched(ParseOutcome),
    Reused(ParseOutcome),
    Failed(TransportError),
    Skipped,
}

/// Main crawler coordinator structure
pub struct Coordinator<'t, T: Transport + ?Sized> {
    config: Config,
    transport: &'t T,
    base_url: Url,
    frontier: Frontier,
    candidates: BTreeMap<String, Vec<Provenance>>,
    listing_keys: HashSet<String>,
    discovered: HashMap<String, DiscoveredPage>,
    provided: HashMap<String, Result<FetchedPage, TransportError>>,
    robots: Option<ParsedRobots>,
    statistics: CrawlStatistics,
    started: Instant,
}

impl<'t, T: Transport + ?Sized> Coordinator<'t, T> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `transport` - Transport used for every request of the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CatalogError)` - The base URL does not parse
    pub fn new(config: &Config, transport: &'t T) -> Result<Self, CatalogError> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        Ok(Self {
            config: config.clone(),
            transport,
            base_url,
            frontier: Frontier::new(),
            candidates: BTreeMap::new(),
            listing_keys: HashSet::new(),
            discovered: HashMap::new(),
            provided: HashMap::new(),
            robots: None,
            statistics: CrawlStatistics::new(),
            started: Instant::now(),
        })
    }

    /// Hands over the result of a request the caller already made
    ///
    /// Discovery uses it in place of fetching `url`. A result discovery
    /// never reaches is counted as an auxiliary request.
    pub fn provide_page(&mut self, url: &str, result: Result<FetchedPage, TransportError>) {
        self.provided.insert(url.to_string(), result);
    }

    /// Runs discovery, the detail pass and the merge
    ///
    /// An empty seed list crawls from the base URL alone. Candidates that
    /// discovery already classified as listing pages are not fetched as products.
    pub async fn run(&mut self, seeds: &[String]) -> Result<Vec<Product>, CatalogError> {
        if self.config.crawler.respect_robots {
            self.robots = Some(fetch_robots(self.transport, &self.base_url).await);
            self.statistics.auxiliary_requests += 1;
        }

        let seeds = self.assemble_seeds(seeds).await;
        info!("Starting discovery from {} seed URLs", seeds.len());
        for seed in seeds {
            self.frontier.push(seed);
        }

        self.discover().await?;
        self.statistics.auxiliary_requests += self.provided.len() as u64;
        self.provided.clear();
        self.prune_candidates();

        let observations = self.collect_products().await;
        let products = merge_products(observations);

        self.statistics.products = products.len() as u64;
        self.statistics.finish();
        info!(
            "Crawl completed: {} products from {} pages in {:?}",
            products.len(),
            self.statistics.pages_attempted(),
            self.started.elapsed()
        );
        Ok(products)
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.statistics
    }

    pub fn into_statistics(self) -> CrawlStatistics {
        self.statistics
    }

    /// Resolves seeds against the base URL and adds sitemap URLs when at
    /// most one seed was given
    async fn assemble_seeds(&mut self, seeds: &[String]) -> Vec<String> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        let base = self.base_url.to_string();
        let raw_seeds: Vec<&str> = if seeds.is_empty() {
            vec![base.as_str()]
        } else {
            seeds.iter().map(String::as_str).collect()
        };

        for seed in raw_seeds {
            match resolve_seed(seed, &self.base_url) {
                Ok(url) => {
                    let url = url.to_string();
                    if seen.insert(url.clone()) {
                        resolved.push(url);
                    }
                }
                Err(e) => warn!("Skipping seed {}: {}", seed, e),
            }
        }

        if resolved.len() <= 1 {
            let extra_sources = self
                .robots
                .as_ref()
                .map(ParsedRobots::sitemaps)
                .unwrap_or_default();
            let discovery = discover_sitemap_urls(
                self.transport,
                &self.base_url,
                &extra_sources,
                self.config.crawler.sitemap_limit,
            )
            .await;
            self.statistics.auxiliary_requests += discovery.documents_fetched as u64;
            for url in discovery.urls {
                if seen.insert(url.clone()) {
                    resolved.push(url);
                }
            }
        }

        resolved
    }

    /// Breadth-first pass over listing pages until the budget or frontier runs out
    async fn discover(&mut self) -> Result<(), CatalogError> {
        let budget = self.config.crawler.page_budget as u64;

        while self.statistics.pages_attempted() < budget {
            if self.limit_reached() {
                info!("Request ceiling or deadline reached, ending discovery");
                self.statistics.stopped_early = true;
                break;
            }
            let Some(url) = self.frontier.pop() else {
                debug!("Frontier is empty, discovery complete");
                break;
            };

            if !self.allowed(&url) {
                info!("URL {} disallowed by robots.txt", url);
                self.frontier.mark_disallowed(&url)?;
                self.statistics.pages_disallowed += 1;
                continue;
            }

            self.frontier.mark_fetching(&url)?;
            let result = match self.provided.remove(&url) {
                Some(result) => result,
                None => self.transport.fetch(&url).await,
            };
            match result {
                Ok(page) => {
                    self.frontier.mark_fetched(&url)?;
                    self.statistics.pages_fetched += 1;
                    self.process_page(&url, page);
                }
                Err(e) => {
                    warn!("Failed to fetch {}: {}", url, e);
                    self.frontier.mark_failed(&url)?;
                    self.statistics.pages_failed += 1;
                    self.discovered
                        .entry(normalize_or_raw(&url))
                        .or_insert(DiscoveredPage::Failed);
                }
            }

            let attempted = self.statistics.pages_attempted();
            if attempted % 10 == 0 {
                info!(
                    "Progress: {} pages crawled, {} visited, {} in frontier, {} candidates",
                    attempted,
                    self.frontier.visited_count(),
                    self.frontier.len(),
                    self.candidates.len()
                );
            }
        }

        Ok(())
    }

    /// Records candidates and follows listing links of a fetched page
    ///
    /// Pages that are not listings are kept for the detail pass.
    fn process_page(&mut self, url: &str, page: FetchedPage) {
        let Ok(page_url) = Url::parse(url) else {
            return;
        };
        let scan = scan_page(&page.body, &page_url, self.config.crawler.listing_link_cap);
        let classification = scan.classification;

        if !classification.is_category() {
            if classification.is_product() {
                self.statistics.product_pages_seen += 1;
            } else {
                debug!("{} is neither a listing nor a product", url);
            }
            self.discovered
                .entry(normalize_or_raw(url))
                .or_insert(DiscoveredPage::Fetched(page));
            return;
        }

        self.statistics.listing_pages += 1;
        self.listing_keys.insert(normalize_or_raw(url));

        for link in &scan.product_links {
            let provenance = self.candidates.entry(normalize_or_raw(link)).or_default();
            if classification.categories.is_empty() {
                provenance.push(Provenance::new(classification.gender, None, url));
            } else {
                for category in &classification.categories {
                    provenance.push(Provenance::new(
                        classification.gender,
                        Some(category.clone()),
                        url,
                    ));
                }
            }
        }

        for link in scan.listing_links {
            if self.frontier.state(&link) == PageState::Unseen {
                self.frontier.push(link);
            }
        }
    }

    /// Drops candidates that discovery already identified as listing pages
    fn prune_candidates(&mut self) {
        self.statistics.candidates = self.candidates.len() as u64;
        let listing_keys = &self.listing_keys;
        self.candidates.retain(|key, _| !listing_keys.contains(key));
        let candidates = &self.candidates;
        self.discovered.retain(|key, _| candidates.contains_key(key));
        let pruned = self.statistics.candidates - self.candidates.len() as u64;
        self.statistics.candidates_pruned = pruned;
        if pruned > 0 {
            debug!("Pruned {} candidates that are listing pages", pruned);
        }
    }

    /// Parses every candidate once, in sorted key order
    ///
    /// Candidates discovery already fetched are parsed from the kept body;
    /// the rest are fetched here.
    async fn collect_products(&mut self) -> Vec<ProductObservation> {
        let mut targets: Vec<String> = self.candidates.keys().cloned().collect();

        if self.robots.is_some() {
            let before = targets.len();
            targets.retain(|url| self.allowed(url));
            self.statistics.pages_disallowed += (before - targets.len()) as u64;
        }

        let mut fetch_room = self
            .config
            .crawler
            .max_requests
            .map(|max| (max as u64).saturating_sub(self.statistics.total_requests()));
        let mut jobs: Vec<(String, Option<FetchedPage>)> = Vec::with_capacity(targets.len());
        let mut over_ceiling = 0usize;

        for url in targets {
            match self.discovered.remove(&url) {
                Some(DiscoveredPage::Fetched(page)) => jobs.push((url, Some(page))),
                Some(DiscoveredPage::Failed) => {
                    debug!("Not refetching {}: its discovery request failed", url);
                }
                None => {
                    if fetch_room == Some(0) {
                        over_ceiling += 1;
                        continue;
                    }
                    if let Some(room) = fetch_room.as_mut() {
                        *room -= 1;
                    }
                    jobs.push((url, None));
                }
            }
        }

        if over_ceiling > 0 {
            info!("Request ceiling left {} product pages unfetched", over_ceiling);
            self.statistics.stopped_early = true;
        }

        info!(
            "Parsing {} product pages, {} of them already fetched",
            jobs.len(),
            jobs.iter().filter(|(_, kept)| kept.is_some()).count()
        );

        let transport = self.transport;
        let deadline = self.deadline();
        let concurrency = self.config.crawler.detail_concurrency.max(1);

        let results: Vec<(String, DetailOutcome)> = stream::iter(jobs)
            .map(|(url, kept)| async move {
                let Ok(requested) = Url::parse(&url) else {
                    return (url, DetailOutcome::Skipped);
                };
                if let Some(page) = kept {
                    let outcome = DetailOutcome::Reused(parse_fetched(&page, &requested));
                    return (url, outcome);
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return (url, DetailOutcome::Skipped);
                }
                let outcome = match transport.fetch(&url).await {
                    Ok(page) => DetailOutcome::Fetched(parse_fetched(&page, &requested)),
                    Err(e) => DetailOutcome::Failed(e),
                };
                (url, outcome)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut observations = Vec::new();
        for (url, outcome) in results {
            let parsed = match outcome {
                DetailOutcome::Fetched(parsed) => {
                    self.statistics.products_fetched += 1;
                    parsed
                }
                DetailOutcome::Reused(parsed) => {
                    self.statistics.products_reused += 1;
                    parsed
                }
                DetailOutcome::Failed(e) => {
                    self.statistics.product_fetch_failures += 1;
                    warn!("Failed to fetch product {}: {}", url, e);
                    continue;
                }
                DetailOutcome::Skipped => {
                    self.statistics.stopped_early = true;
                    continue;
                }
            };
            match parsed {
                ParseOutcome::Parsed(record) => {
                    let provenance = self.provenance_for(&url, &record);
                    observations.push(ProductObservation { record, provenance });
                }
                rejection => {
                    self.statistics.parse_rejections += 1;
                    debug!("No product record at {}: {:?}", url, rejection);
                }
            }
        }
        observations
    }

    /// Provenance recorded under the candidate key and, if different, the canonical key
    fn provenance_for(&self, candidate: &str, record: &RawProduct) -> Vec<Provenance> {
        let mut provenance = self.candidates.get(candidate).cloned().unwrap_or_default();
        let key = canonical_key(record);
        if key != candidate {
            if let Some(extra) = self.candidates.get(&key) {
                provenance.extend(extra.iter().cloned());
            }
        }
        provenance
    }

    fn allowed(&self, url: &str) -> bool {
        match &self.robots {
            Some(robots) => is_allowed(robots, url, &self.config.http.user_agent),
            None => true,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.config
            .crawler
            .max_duration_secs
            .map(|secs| self.started + Duration::from_secs(secs))
    }

    fn limit_reached(&self) -> bool {
        if self.deadline().is_some_and(|d| Instant::now() >= d) {
            return true;
        }
        match self.config.crawler.max_requests {
            Some(max) => self.statistics.total_requests() >= max as u64,
            None => false,
        }
    }
}

/// Parses a fetched page against its post-redirect URL
fn parse_fetched(page: &FetchedPage, requested: &Url) -> ParseOutcome {
    match Url::parse(&page.final_url) {
        Ok(final_url) => parse_product_page(&page.body, &final_url),
        Err(_) => parse_product_page(&page.body, requested),
    }
}

/// Classifies a page and harvests its links
///
/// Links are only extracted from listing pages.
fn scan_page(body: &str, url: &Url, cap: usize) -> PageScan {
    let document = Html::parse_document(body);
    let classification = classify_document(&document, url);
    let (product_links, listing_links) = if classification.is_category() {
        (
            product_links(&document, url),
            listing_links(&document, url, cap),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    PageScan {
        classification,
        product_links,
        listing_links,
    }
}
