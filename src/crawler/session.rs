//! Per-run crawl session: frontier, visited set and collected documents
//!
//! This module handles:
//! - FIFO frontier management with queued/visited deduplication
//! - The page ceiling for a single run
//! - Crawl state transitions and the consecutive-failure breaker

use crate::state::{CrawlState, FailureBreaker};
use crate::types::Document;
use crate::HarvestError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// All mutable state of one crawl run
///
/// A session is created by the crawler for a single invocation and dropped
/// when the run's results have been persisted.
#[derive(Debug)]
pub struct CrawlSession {
    state: CrawlState,

    /// URLs waiting to be fetched, in discovery order
    frontier: VecDeque<Url>,

    /// Mirror of `frontier` for membership checks
    queued: HashSet<String>,

    /// Fetched URLs in the order they were visited
    visited: Vec<String>,
    visited_set: HashSet<String>,

    documents: Vec<Document>,
    breaker: FailureBreaker,
    pages_fetched: usize,
    max_pages: usize,
}

impl CrawlSession {
    /// Creates an idle session
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Ceiling on fetches for this run
    /// * `failure_threshold` - Consecutive failures that abort the run
    pub fn new(max_pages: usize, failure_threshold: u32) -> Self {
        Self {
            state: CrawlState::Idle,
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            visited: Vec::new(),
            visited_set: HashSet::new(),
            documents: Vec::new(),
            breaker: FailureBreaker::new(failure_threshold),
            pages_fetched: 0,
            max_pages,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Moves the session to `next`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Transition applied
    /// * `Err(HarvestError::InvalidTransition)` - Transition not allowed from the current state
    pub fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Adds a URL to the back of the frontier
    ///
    /// Returns false if the URL was already visited or is already queued.
    pub fn enqueue(&mut self, url: Url) -> bool {
        let key = url.as_str();
        if self.visited_set.contains(key) || self.queued.contains(key) {
            return false;
        }

        self.queued.insert(key.to_string());
        self.frontier.push_back(url);
        true
    }

    /// Takes the next unvisited URL off the frontier
    ///
    /// Already visited entries are dropped without counting toward the page
    /// ceiling.
    pub fn next_url(&mut self) -> Option<Url> {
        while let Some(url) = self.frontier.pop_front() {
            self.queued.remove(url.as_str());
            if self.visited_set.contains(url.as_str()) {
                tracing::trace!("Skipping already visited {}", url);
                continue;
            }
            return Some(url);
        }
        None
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if !self.visited_set.insert(url.as_str().to_string()) {
            return false;
        }
        self.visited.push(url.as_str().to_string());
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited_set.contains(url)
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// True once the run has fetched `max_pages` pages
    pub fn at_page_ceiling(&self) -> bool {
        self.pages_fetched >= self.max_pages
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Records a fetch that did not fail
    pub fn record_success(&mut self) {
        self.pages_fetched += 1;
        self.breaker.record_success();
    }

    /// Records a failed fetch; returns true if the breaker tripped
    pub fn record_failure(&mut self) -> bool {
        self.pages_fetched += 1;
        self.breaker.record_failure()
    }

    pub fn failures(&self) -> usize {
        self.breaker.total_failures()
    }

    pub fn push_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Consumes the session, returning its documents and visited URLs
    pub fn into_parts(self) -> (Vec<Document>, Vec<String>) {
        (self.documents, self.visited)
    }
}
