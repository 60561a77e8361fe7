//! Breadth-first frontier and visited ledger
//!
//! This module handles:
//! - FIFO ordering of URLs waiting to be fetched
//! - The visited set (URLs whose fetch finished, successfully or not)
//! - Per-URL `PageState` bookkeeping with checked transitions
//!
//! Duplicate enqueues of a URL that is still waiting are tolerated; the
//! duplicate is skipped when it reaches the head of the queue.

use crate::state::PageState;
use crate::CatalogError;
use std::collections::{HashMap, HashSet, VecDeque};

/// The discovery frontier
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    states: HashMap<String, PageState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the tail unless it was already visited
    ///
    /// # Returns
    ///
    /// `true` if the URL was appended
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) {
            return false;
        }
        if self.state(&url) == PageState::Unseen {
            self.states.insert(url.clone(), PageState::Queued);
        }
        self.queue.push_back(url);
        true
    }

    /// Pops the next URL still waiting to be fetched
    pub fn pop(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            if self.state(&url) == PageState::Queued {
                return Some(url);
            }
        }
        None
    }

    /// Current state of a URL; `Unseen` if never queued
    pub fn state(&self, url: &str) -> PageState {
        self.states.get(url).copied().unwrap_or(PageState::Unseen)
    }

    pub fn mark_fetching(&mut self, url: &str) -> Result<(), CatalogError> {
        self.transition(url, PageState::Fetching)
    }

    pub fn mark_fetched(&mut self, url: &str) -> Result<(), CatalogError> {
        self.transition(url, PageState::Fetched)?;
        self.visited.insert(url.to_string());
        Ok(())
    }

    pub fn mark_failed(&mut self, url: &str) -> Result<(), CatalogError> {
        self.transition(url, PageState::FetchFailed)?;
        self.visited.insert(url.to_string());
        Ok(())
    }

    pub fn mark_disallowed(&mut self, url: &str) -> Result<(), CatalogError> {
        self.transition(url, PageState::Disallowed)?;
        self.visited.insert(url.to_string());
        Ok(())
    }

    fn transition(&mut self, url: &str, next: PageState) -> Result<(), CatalogError> {
        let current = self.state(url);
        if !current.can_transition_to(next) {
            return Err(CatalogError::InvalidTransition {
                url: url.to_string(),
                from: current,
                to: next,
            });
        }
        self.states.insert(url.to_string(), next);
        Ok(())
    }

    /// Number of entries in the queue, stale duplicates included
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
