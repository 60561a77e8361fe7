//! In-memory transport for orchestrator tests

use super::fetcher::{FetchedPage, Transport};
use crate::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned pages and records every requested URL
#[derive(Default)]
pub struct MockTransport {
    pages: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with status 200 at `url`
    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), (200, body.into()));
        self
    }

    /// Answers `url` with an error status
    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), (status, String::new()));
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some((status, body)) if (200..300).contains(status) => Ok(FetchedPage {
                final_url: url.to_string(),
                body: body.clone(),
            }),
            Some((status, _)) => Err(TransportError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
