//! Crawler module for documentation page fetching and processing
//!
//! This module contains the documentation crawling logic, including:
//! - HTTP fetching and error classification
//! - Link discovery against the configured site scopes
//! - Main-region text, heading and code extraction
//! - The per-run session (frontier, visited set, breaker)
//! - Overall crawl coordination and persistence

mod coordinator;
mod extract;
mod fetcher;
mod links;
mod session;

pub use coordinator::{CrawlReport, DocCrawler};
pub use extract::{extract_document, MIN_CODE_LENGTH};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use links::discover_links;
pub use session::CrawlSession;

use crate::config::Config;
use crate::storage::open_storage;
use crate::HarvestError;
use std::path::Path;

/// Runs a complete documentation crawl
///
/// This is the main entry point for crawling. It will:
/// 1. Open the corpus directory
/// 2. Skip seeds that are still fresh (unless forced)
/// 3. Fetch pages, following in-scope links
/// 4. Persist documents, the doc index and crawl stats
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `force` - Ignore the freshness policy
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (or was skipped as fresh)
/// * `Err(HarvestError)` - Crawl could not start or persist
pub async fn crawl(config: &Config, force: bool) -> Result<CrawlReport, HarvestError> {
    let storage = open_storage(Path::new(&config.output.data_dir))?;
    let mut crawler = DocCrawler::new(config, storage)?;
    crawler.run(force).await
}
