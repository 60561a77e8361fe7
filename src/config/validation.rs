use crate::config::types::{Config, CrawlerConfig, HttpConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    if config.page_budget < 1 {
        return Err(ConfigError::Validation(format!(
            "page_budget must be >= 1, got {}",
            config.page_budget
        )));
    }

    if config.listing_link_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "listing_link_cap must be >= 1, got {}",
            config.listing_link_cap
        )));
    }

    if config.detail_concurrency < 1 || config.detail_concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and 32, got {}",
            config.detail_concurrency
        )));
    }

    if config.max_requests == Some(0) {
        return Err(ConfigError::Validation(
            "max_requests must be >= 1 when set".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    Ok(())
}

/// Validates HTTP transport configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.backoff_initial_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_initial_ms ({}) cannot exceed backoff_max_ms ({})",
            config.backoff_initial_ms, config.backoff_max_ms
        )));
    }

    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            base_url
        )));
    }

    Ok(())
}

/// Seeds are either site-relative paths or absolute http(s) URLs
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if seed.starts_with('/') {
        return Ok(());
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    Ok(())
}
