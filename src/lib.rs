//! onyx-harvest: documentation crawler, repository harvester and corpus search
//!
//! This crate crawls the documentation site of the Onyx language, walks
//! source repositories on a code-hosting API, normalizes both into flat JSON
//! corpora and answers keyword queries across them.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod github;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod types;
pub mod url;

use thiserror::Error;

/// Main error type for onyx-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid crawl state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for onyx-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, DocCrawler};
pub use github::{HarvestReport, RepositoryWalker};
pub use search::{SearchEngine, SearchSource};
pub use state::CrawlState;
pub use url::{normalize_url, LinkDecision, ScopePolicy};
