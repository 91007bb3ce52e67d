//! Link scope policy: decides which discovered links stay on the crawl

use crate::config::SiteEntry;
use crate::url::normalize::{normalize_http_url, normalize_url};
use crate::UrlError;
use url::Url;

/// Outcome of classifying a discovered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// In scope; carries the normalized absolute URL
    Accept(Url),
    /// Out of scope
    Reject(RejectReason),
}

impl LinkDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept(_))
    }

    pub fn accepted(self) -> Option<Url> {
        match self {
            Self::Accept(url) => Some(url),
            Self::Reject(_) => None,
        }
    }
}

/// Why a link was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    NonHttpScheme,
    Unresolvable,
    ForeignHost,
    OutsidePrefixes,
    Excluded,
}

/// Schemes rejected before any resolution is attempted
const REJECTED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Allow-list describing the part of a site the crawler may visit
///
/// A link is accepted only when its host equals `host` exactly, its path starts
/// with one of `allow_prefixes`, and no exclusion matches. Missing an in-scope
/// page is preferred over wandering off-site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePolicy {
    host: String,
    allow_prefixes: Vec<String>,
    exclude_substrings: Vec<String>,
    exclude_suffixes: Vec<String>,
    exclude_paths: Vec<String>,
}

impl ScopePolicy {
    /// Creates a policy with no exclusions
    pub fn new(host: &str, allow_prefixes: &[&str]) -> Self {
        Self {
            host: host.to_ascii_lowercase(),
            allow_prefixes: allow_prefixes.iter().map(|p| p.to_string()).collect(),
            exclude_substrings: Vec::new(),
            exclude_suffixes: Vec::new(),
            exclude_paths: Vec::new(),
        }
    }

    /// Builds the policy for a configured site; the seed's host is the allowed host
    pub fn from_site(site: &SiteEntry) -> Result<Self, UrlError> {
        let seed = normalize_http_url(&site.seed)?;
        let host = seed.host_str().ok_or(UrlError::MissingHost)?;

        Ok(Self {
            host: host.to_ascii_lowercase(),
            allow_prefixes: site.allow_prefixes.clone(),
            exclude_substrings: site.exclude_substrings.clone(),
            exclude_suffixes: site
                .exclude_suffixes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            exclude_paths: site.exclude_paths.clone(),
        })
    }

    pub fn with_excluded_substrings(mut self, substrings: &[&str]) -> Self {
        self.exclude_substrings = substrings.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_excluded_suffixes(mut self, suffixes: &[&str]) -> Self {
        self.exclude_suffixes = suffixes.iter().map(|s| s.to_ascii_lowercase()).collect();
        self
    }

    pub fn with_excluded_paths(mut self, paths: &[&str]) -> Self {
        self.exclude_paths = paths.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Classifies a link found on `page_url`
    ///
    /// Relative links are resolved against `page_url` before host and path
    /// checks; accepted links come back normalized.
    pub fn classify(&self, link: &str, page_url: &Url) -> LinkDecision {
        let link = link.trim();
        if link.is_empty() {
            return LinkDecision::Reject(RejectReason::Empty);
        }

        let lower = link.to_ascii_lowercase();
        if REJECTED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return LinkDecision::Reject(RejectReason::NonHttpScheme);
        }

        let resolved = match page_url.join(link) {
            Ok(url) => url,
            Err(_) => return LinkDecision::Reject(RejectReason::Unresolvable),
        };

        let normalized = match normalize_url(resolved.as_str()) {
            Ok(url) => url,
            Err(_) => return LinkDecision::Reject(RejectReason::Unresolvable),
        };

        match self.check(&normalized) {
            Some(reason) => LinkDecision::Reject(reason),
            None => LinkDecision::Accept(normalized),
        }
    }

    /// Returns true if an absolute URL falls inside this scope
    pub fn contains(&self, url: &Url) -> bool {
        self.check(url).is_none()
    }

    fn check(&self, url: &Url) -> Option<RejectReason> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Some(RejectReason::NonHttpScheme);
        }

        let host_matches = url
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false);
        if !host_matches {
            return Some(RejectReason::ForeignHost);
        }

        let path = url.path();
        if !self.allows_path(path) {
            return Some(RejectReason::OutsidePrefixes);
        }

        if self.is_excluded(path) {
            return Some(RejectReason::Excluded);
        }

        None
    }

    /// Normalized paths lose their trailing slash, so `/book` still sits
    /// under the prefix `/book/`
    fn allows_path(&self, path: &str) -> bool {
        self.allow_prefixes.iter().any(|prefix| {
            path.starts_with(prefix.as_str()) || prefix.strip_suffix('/') == Some(path)
        })
    }

    fn is_excluded(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();

        self.exclude_paths.iter().any(|p| p == path)
            || self
                .exclude_substrings
                .iter()
                .any(|s| path.contains(s.as_str()))
            || self
                .exclude_suffixes
                .iter()
                .any(|s| lower.ends_with(s.as_str()))
    }
}

/// Classifies a link against several site policies; the first acceptance wins
///
/// With no policies every link is rejected as foreign.
pub fn classify_link(link: &str, page_url: &Url, policies: &[ScopePolicy]) -> LinkDecision {
    let mut last = LinkDecision::Reject(RejectReason::ForeignHost);
    for policy in policies {
        match policy.classify(link, page_url) {
            accepted @ LinkDecision::Accept(_) => return accepted,
            rejected => last = rejected,
        }
    }
    last
}
