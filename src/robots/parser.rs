//! Robots.txt parser implementation
//!
//! Rule matching is delegated to the robotstxt crate; this wrapper also reads
//! the `Sitemap:` lines used to seed sitemap discovery.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Set when no robots.txt could be read
    allow_all: bool,
}

impl ParsedRobots {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// A permissive ParsedRobots that allows everything
    ///
    /// Used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks if an absolute URL may be fetched by `user_agent`
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// URLs listed in `Sitemap:` directives, in file order
    pub fn sitemaps(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let (key, value) = line.trim().split_once(':')?;
                if !key.trim().eq_ignore_ascii_case("sitemap") {
                    return None;
                }
                let value = value.trim();
                (!value.is_empty()).then(|| value.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOTS: &str = "User-agent: *\nDisallow: /checkout\nDisallow: /account\n\nSitemap: https://shop.example.com/sitemap.xml\nsitemap:https://shop.example.com/extra.xml\n";

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("https://shop.example.com/checkout", "CatalogBot"));
        assert!(robots.sitemaps().is_empty());
    }

    #[test]
    fn test_disallow_rules() {
        let robots = ParsedRobots::from_content(ROBOTS);
        assert!(!robots.is_allowed("https://shop.example.com/checkout/step-1", "CatalogBot"));
        assert!(!robots.is_allowed("https://shop.example.com/account", "CatalogBot"));
        assert!(robots.is_allowed("https://shop.example.com/men-jackets", "CatalogBot"));
    }

    #[test]
    fn test_empty_content_allows() {
        let robots = ParsedRobots::from_content("   \n");
        assert!(robots.is_allowed("https://shop.example.com/anything", "CatalogBot"));
    }

    #[test]
    fn test_sitemap_lines() {
        let robots = ParsedRobots::from_content(ROBOTS);
        assert_eq!(
            robots.sitemaps(),
            vec![
                "https://shop.example.com/sitemap.xml",
                "https://shop.example.com/extra.xml"
            ]
        );
    }
}
