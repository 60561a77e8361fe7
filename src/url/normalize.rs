use crate::UrlError;
use url::Url;

/// Normalizes a URL to its comparison key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Lowercase the host (the parser already does this for http/https)
/// 4. Keep scheme, host, port and path
/// 5. Drop query string and fragment
///
/// The key is itself a valid URL, so normalizing a key returns it unchanged.
///
/// # Examples
///
/// ```
/// use catalog_crawler::url::normalize_url;
///
/// let key = normalize_url("https://WWW.Shop.COM/Red-Jacket?variant=2#reviews").unwrap();
/// assert_eq!(key, "https://www.shop.com/Red-Jacket");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(url: &Url) -> Result<String, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();

    let path = if url.path().is_empty() { "/" } else { url.path() };

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, path),
        None => format!("{}://{}{}", url.scheme(), host, path),
    })
}

/// Normalizes a URL, falling back to the trimmed input when it cannot be parsed
///
/// Used where a key is always needed, such as grouping product records.
pub fn normalize_or_raw(url_str: &str) -> String {
    normalize_url(url_str).unwrap_or_else(|_| url_str.trim().to_string())
}
