//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Pacing requests so they start at least `delay-ms` apart
//! - Retrying transient failures with exponential backoff
//! - Error classification into `TransportError`

use crate::config::HttpConfig;
use crate::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// Page body content
    pub body: String,
}

/// Source of page bodies
///
/// The crawler only talks to the network through this trait, so tests can
/// swap in canned pages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, returning the body of a 2xx response
    async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError>;
}

/// Enforces a minimum gap between request starts
///
/// Shared by every caller of one transport, so the politeness delay holds
/// even when the detail pass runs several fetches at once.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_start: Mutex::new(None),
        }
    }

    /// Waits until the next request may start, then records the start
    pub async fn wait(&self) {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + self.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());
    }
}

/// Exponential backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial: Duration,
    pub max: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial: Duration::from_millis(config.backoff_initial_ms),
            max: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Delay after failed attempt number `attempt` (1-based):
    /// `min(initial * 2^(attempt-1), max)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed transport with pacing and retries
pub struct HttpTransport {
    client: Client,
    pacer: Pacer,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Creates a transport from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            pacer: Pacer::new(Duration::from_millis(config.delay_ms)),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// One request, no retries
    async fn fetch_once(&self, url: &str) -> Result<FetchedPage, TransportError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TransportError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchedPage { final_url, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429, HTTP 5xx | Retry with backoff |
    /// | Timeout, connection error | Retry with backoff |
    /// | Other HTTP 4xx | Fail immediately |
    /// | Body read error | Fail immediately |
    async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError> {
        let mut attempt = 1;
        loop {
            self.pacer.wait().await;
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt,
                        self.retry.max_attempts,
                        url,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
