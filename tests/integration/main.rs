//! Integration tests for onyx-harvest
//!
//! These tests run the crawler, the repository walker and the search engine
//! end-to-end against wiremock servers and temporary data directories.

mod common;
mod crawl_tests;
mod harvest_tests;
mod search_tests;
