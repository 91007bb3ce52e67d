//! Link discovery on fetched pages
//!
//! Links are collected from the full parsed document, before any boilerplate
//! is stripped, so navigation sidebars still feed the frontier.

use crate::url::{classify_link, LinkDecision, ScopePolicy};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

static CANONICAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel='canonical'][href]").expect("canonical selector")
});

/// Extracts in-scope links from a parsed page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - Anything the scope policies reject
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `page_url` - The URL the page was fetched from, used to resolve relative links
/// * `policies` - Site scopes; a link accepted by any of them is kept
///
/// # Returns
///
/// Normalized in-scope URLs in document order, without duplicates
pub fn discover_links(document: &Html, page_url: &Url, policies: &[ScopePolicy]) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let anchors = document
        .select(&ANCHOR_SELECTOR)
        .filter(|element| element.value().attr("download").is_none());
    let canonical = document.select(&CANONICAL_SELECTOR);

    for element in anchors.chain(canonical) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match classify_link(href, page_url, policies) {
            LinkDecision::Accept(url) => {
                if seen.insert(url.as_str().to_string()) {
                    links.push(url);
                }
            }
            LinkDecision::Reject(reason) => {
                tracing::trace!("Rejected link {} on {}: {:?}", href, page_url, reason);
            }
        }
    }

    links
}
