//! Documentation crawl orchestration
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! a documentation crawl, including:
//! - Applying the per-seed freshness policy
//! - Driving the frontier through fetch, link discovery and extraction
//! - Tripping the consecutive-failure breaker
//! - Persisting documents, the reduced index and crawl stats

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extract::extract_document;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::links::discover_links;
use crate::crawler::session::CrawlSession;
use crate::state::CrawlState;
use crate::storage::Storage;
use crate::types::{CrawlStats, DocIndexEntry, Document};
use crate::url::{normalize_http_url, ScopePolicy};
use crate::HarvestError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use scraper::Html;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use url::Url;

/// A configured site: its normalized seed and link scope
#[derive(Debug, Clone)]
struct CrawlSite {
    seed: Url,
    policy: ScopePolicy,
}

/// Outcome of one [`DocCrawler::run`]
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Final state of the run
    pub state: CrawlState,

    /// Documents extracted in this run
    pub documents: usize,

    /// Documents persisted, including ones carried over from skipped seeds
    pub documents_persisted: usize,

    /// Pages fetched (successfully or not)
    pub urls_crawled: usize,

    /// Every URL visited, in visit order
    pub visited: Vec<String>,

    /// Seeds skipped by the freshness policy
    pub skipped_seeds: Vec<String>,

    pub failures: usize,

    /// False when every seed was fresh and nothing was written
    pub persisted: bool,
}

/// Single-domain documentation crawler
pub struct DocCrawler<S: Storage> {
    crawler: CrawlerConfig,
    sites: Vec<CrawlSite>,
    storage: S,
    client: Client,
}

impl<S: Storage> DocCrawler<S> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration; every `[[site]]` becomes a seed
    /// * `storage` - Destination for the documentation corpus
    ///
    /// # Returns
    ///
    /// * `Ok(DocCrawler)` - Ready to run
    /// * `Err(HarvestError)` - A seed was invalid or the HTTP client failed to build
    pub fn new(config: &Config, storage: S) -> Result<Self, HarvestError> {
        let sites = config
            .sites
            .iter()
            .map(|site| -> Result<CrawlSite, HarvestError> {
                Ok(CrawlSite {
                    seed: normalize_http_url(&site.seed)?,
                    policy: ScopePolicy::from_site(site)?,
                })
            })
            .collect::<Result<Vec<_>, HarvestError>>()?;

        let client = build_http_client(&config.user_agent, &config.crawler)?;

        Ok(Self {
            crawler: config.crawler.clone(),
            sites,
            storage,
            client,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs one crawl
    ///
    /// Seeds crawled within `freshness-days` are skipped unless `force` is set.
    /// When every seed is skipped nothing is fetched or written.
    ///
    /// # Arguments
    ///
    /// * `force` - Ignore the freshness policy
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run finished (done or aborted) and results were persisted
    /// * `Err(HarvestError)` - Persisting the corpus failed
    pub async fn run(&mut self, force: bool) -> Result<CrawlReport, HarvestError> {
        let previous = self.previous_stats();
        let started_at = Utc::now();

        let (due, skipped) = self.partition_seeds(previous.as_ref(), force, started_at);
        let skipped_seeds: Vec<String> = skipped.iter().map(|s| s.seed.to_string()).collect();

        let mut session = CrawlSession::new(self.crawler.max_pages, self.crawler.max_consecutive_failures);

        if due.is_empty() {
            tracing::info!(
                "All {} seeds crawled within {} days, skipping crawl",
                skipped.len(),
                self.crawler.freshness_days
            );
            session.transition(CrawlState::Done)?;
            return Ok(CrawlReport {
                state: session.state(),
                documents: 0,
                documents_persisted: 0,
                urls_crawled: 0,
                visited: Vec::new(),
                skipped_seeds,
                failures: 0,
                persisted: false,
            });
        }

        for site in &skipped {
            tracing::info!("Skipping fresh seed {}", site.seed);
        }

        session.transition(CrawlState::Running)?;
        for site in &due {
            session.enqueue(site.seed.clone());
        }

        self.crawl_frontier(&mut session).await?;

        if session.state() == CrawlState::Running {
            session.transition(CrawlState::Done)?;
        }

        let state = session.state();
        let failures = session.failures();
        let urls_crawled = session.pages_fetched();
        let (mut documents, visited) = session.into_parts();
        let extracted = documents.len();

        if !skipped.is_empty() {
            let carried = self.carry_forward(&skipped, &visited, &documents);
            tracing::info!("Carrying forward {} documents from fresh seeds", carried.len());
            documents.extend(carried);
        }

        let stats = build_stats(
            &documents,
            urls_crawled,
            &due,
            &skipped,
            previous.as_ref(),
            started_at,
            state,
            failures,
        );
        self.persist(&documents, &stats)?;

        tracing::info!(
            "Crawl {}: {} documents from {} pages ({} failures)",
            state,
            extracted,
            urls_crawled,
            failures
        );

        Ok(CrawlReport {
            state,
            documents: extracted,
            documents_persisted: documents.len(),
            urls_crawled,
            visited,
            skipped_seeds,
            failures,
            persisted: true,
        })
    }

    /// Processes the frontier until it drains, the page ceiling is reached or
    /// the breaker trips
    async fn crawl_frontier(&self, session: &mut CrawlSession) -> Result<(), HarvestError> {
        let delay = Duration::from_millis(self.crawler.delay_ms);
        let policies: Vec<ScopePolicy> = self.sites.iter().map(|s| s.policy.clone()).collect();

        loop {
            if session.at_page_ceiling() {
                tracing::info!("Reached page ceiling of {}", self.crawler.max_pages);
                break;
            }

            let Some(url) = session.next_url() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            session.mark_visited(&url);
            tracing::debug!("Fetching {}", url);

            match fetch_url(&self.client, url.as_str()).await {
                FetchResult::Success {
                    final_url, body, ..
                } => {
                    session.record_success();

                    let base = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
                    let (document, links) = process_page(&body, &url, &base, &policies);

                    let mut discovered = 0;
                    for link in links {
                        if session.enqueue(link) {
                            discovered += 1;
                        }
                    }
                    tracing::debug!("{}: {} new links", url, discovered);

                    match document {
                        Some(document) => session.push_document(document),
                        None => tracing::debug!("{}: no content extracted", url),
                    }
                }

                FetchResult::ContentMismatch { content_type } => {
                    session.record_success();
                    tracing::debug!("{}: skipping non-HTML content ({})", url, content_type);
                }

                failure @ (FetchResult::HttpError { .. } | FetchResult::NetworkError { .. }) => {
                    tracing::warn!("Failed to fetch {}: {:?}", url, failure);
                    if session.record_failure() {
                        tracing::error!(
                            "Aborting crawl after {} consecutive failures",
                            self.crawler.max_consecutive_failures
                        );
                        session.transition(CrawlState::Aborted)?;
                        break;
                    }
                }
            }

            if session.pages_fetched() % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier, {} documents",
                    session.pages_fetched(),
                    session.frontier_len(),
                    session.documents().len()
                );
            }

            if session.frontier_len() > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }

    /// Loads the previous crawl stats; an unreadable record counts as none
    fn previous_stats(&self) -> Option<CrawlStats> {
        match self.storage.load_crawl_stats() {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Ignoring unreadable crawl stats: {}", e);
                None
            }
        }
    }

    /// Splits sites into those due for a crawl and those still fresh
    fn partition_seeds(
        &self,
        previous: Option<&CrawlStats>,
        force: bool,
        now: DateTime<Utc>,
    ) -> (Vec<CrawlSite>, Vec<CrawlSite>) {
        let window = ChronoDuration::days(self.crawler.freshness_days);

        self.sites.iter().cloned().partition(|site| {
            if force {
                return true;
            }
            match previous.and_then(|stats| stats.last_crawled(site.seed.as_str())) {
                Some(last) => now.signed_duration_since(last) >= window,
                None => true,
            }
        })
    }

    /// Previous documents belonging to skipped seeds that this run did not revisit
    fn carry_forward(
        &self,
        skipped: &[CrawlSite],
        visited: &[String],
        fresh: &[Document],
    ) -> Vec<Document> {
        let previous = match self.storage.load_documents() {
            Ok(documents) => documents,
            Err(e) if e.is_not_found() => return Vec::new(),
            Err(e) => {
                tracing::warn!("Cannot carry forward previous documents: {}", e);
                return Vec::new();
            }
        };

        let mut taken: HashSet<&str> = visited.iter().map(String::as_str).collect();
        taken.extend(fresh.iter().map(|d| d.url.as_str()));

        previous
            .into_iter()
            .filter(|doc| !taken.contains(doc.url.as_str()))
            .filter(|doc| {
                Url::parse(&doc.url)
                    .map(|url| skipped.iter().any(|site| site.policy.contains(&url)))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn persist(&mut self, documents: &[Document], stats: &CrawlStats) -> Result<(), HarvestError> {
        let index: Vec<DocIndexEntry> = documents.iter().map(DocIndexEntry::from).collect();

        self.storage.save_documents(documents)?;
        self.storage.save_doc_index(&index)?;
        self.storage.save_crawl_stats(stats)?;

        tracing::info!("Saved {} documents", documents.len());
        Ok(())
    }
}

/// Parses a fetched page once, discovering links and extracting the document
///
/// Kept synchronous: the parsed tree is not `Send` and must not live across an
/// await point.
fn process_page(
    body: &str,
    url: &Url,
    base: &Url,
    policies: &[ScopePolicy],
) -> (Option<Document>, Vec<Url>) {
    let html = Html::parse_document(body);
    let links = discover_links(&html, base, policies);
    let document = extract_document(&html, url);
    (document, links)
}

#[allow(clippy::too_many_arguments)]
fn build_stats(
    documents: &[Document],
    urls_crawled: usize,
    due: &[CrawlSite],
    skipped: &[CrawlSite],
    previous: Option<&CrawlStats>,
    crawl_date: DateTime<Utc>,
    state: CrawlState,
    failures: usize,
) -> CrawlStats {
    let mut seed_crawled_at = BTreeMap::new();
    for site in skipped {
        let seed = site.seed.to_string();
        if let Some(last) = previous.and_then(|stats| stats.last_crawled(&seed)) {
            seed_crawled_at.insert(seed, last);
        }
    }
    for site in due {
        seed_crawled_at.insert(site.seed.to_string(), crawl_date);
    }

    CrawlStats {
        total_docs: documents.len(),
        total_code_examples: documents.iter().map(|d| d.code_examples.len()).sum(),
        urls_crawled,
        base_urls: due
            .iter()
            .chain(skipped.iter())
            .map(|site| site.seed.to_string())
            .collect(),
        crawl_date,
        final_state: state.to_string(),
        failures,
        seed_crawled_at,
    }
}
