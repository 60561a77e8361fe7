//! State module for tracking crawl progress
//!
//! `PageState` is the per-URL lifecycle the frontier ledger enforces.

mod page_state;

pub use page_state::PageState;
