use crate::UrlError;
use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is dropped; it never changes what is fetched.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}

/// Resolves a seed (absolute, or relative to the site root) to an absolute URL
pub fn resolve_seed(seed: &str, base_url: &Url) -> Result<Url, UrlError> {
    resolve_link(seed, base_url)
        .ok_or_else(|| UrlError::Parse(format!("cannot resolve seed '{}'", seed)))
}

/// Returns true if both URLs point at the same host and port
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => {
            ha.eq_ignore_ascii_case(hb) && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}

/// Returns true if both URLs name the same host, whatever their scheme or port
pub fn same_host_name(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => ha.eq_ignore_ascii_case(hb),
        _ => false,
    }
}

/// Returns true if the URL carries an explicit `page` query parameter
pub fn has_page_param(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, _)| key.eq_ignore_ascii_case("page"))
}

/// Makes an image source absolute: `//cdn/x` gets `https:`, relative paths
/// are joined onto the page URL, anything unparseable is kept verbatim
pub fn absolutize_src(src: &str, page_url: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    match page_url.join(src) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Some(src.to_string()),
    }
}
