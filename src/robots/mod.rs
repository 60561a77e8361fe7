//! Robots.txt handling module
//!
//! The robots gate is optional. When enabled, the site's robots.txt is
//! fetched once through the crawl transport and consulted before every
//! discovery and detail request.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Transport;
use url::Url;

/// Fetches and parses `/robots.txt` for the site at `base_url`
///
/// # Arguments
///
/// * `transport` - The transport used for the request
/// * `base_url` - Any URL on the site
///
/// # Returns
///
/// The parsed rules, or [`ParsedRobots::allow_all`] when the file is missing
/// or the request fails
pub async fn fetch_robots<T: Transport + ?Sized>(transport: &T, base_url: &Url) -> ParsedRobots {
    let Ok(robots_url) = base_url.join("/robots.txt") else {
        return ParsedRobots::allow_all();
    };

    match transport.fetch(robots_url.as_str()).await {
        Ok(page) => {
            tracing::debug!("Loaded robots.txt from {}", robots_url);
            ParsedRobots::from_content(&page.body)
        }
        Err(e) => {
            tracing::debug!("No usable robots.txt at {} ({}), allowing all", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Checks if a URL is allowed by robots.txt
pub fn is_allowed(robots: &ParsedRobots, url: &str, user_agent: &str) -> bool {
    robots.is_allowed(url, user_agent)
}
