//! Query result types
//!
//! Everything here is transient and serializable; nothing is persisted.

use crate::storage::{Collection, StorageError};
use crate::types::{FileType, TopicExample};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A corpus the combined search can draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Documentation pages
    Docs,
    /// Repository files
    Github,
    /// Extracted code patterns
    Patterns,
}

impl SearchSource {
    pub const ALL: [SearchSource; 3] = [Self::Docs, Self::Github, Self::Patterns];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::Github => "github",
            Self::Patterns => "patterns",
        }
    }
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docs" => Ok(Self::Docs),
            "github" => Ok(Self::Github),
            "patterns" => Ok(Self::Patterns),
            other => Err(format!(
                "unknown source '{}' (expected docs, github or patterns)",
                other
            )),
        }
    }
}

/// Structured search failure, returned as data rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "kebab-case")]
pub enum SearchError {
    #[error("{corpus} corpus not available yet, populate data first")]
    Unavailable { corpus: String },

    #[error("{corpus} corpus is corrupt: {message}")]
    Corrupt { corpus: String, message: String },

    #[error("{corpus} corpus could not be loaded: {message}")]
    LoadFailed { corpus: String, message: String },
}

impl SearchError {
    pub fn from_storage(collection: Collection, error: &StorageError) -> Self {
        let corpus = collection.name().to_string();
        match error {
            StorageError::NotFound(_) => Self::Unavailable { corpus },
            StorageError::Corrupt { message, .. } => Self::Corrupt {
                corpus,
                message: message.clone(),
            },
            other => Self::LoadFailed {
                corpus,
                message: other.to_string(),
            },
        }
    }
}

/// A ranked documentation page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocResult {
    pub url: String,
    pub title: String,
    pub score: u32,
    pub snippet: String,
}

/// A ranked repository file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub repository: String,
    pub path: String,
    pub url: String,
    pub file_type: FileType,
    pub score: u32,
    pub snippet: String,
}

/// A ranked code pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternResult {
    /// import, function, struct or enum
    pub kind: String,
    pub definition: String,
    pub path: String,
    pub repository: String,
    pub url: String,
    pub score: u32,
}

/// One entry of a combined search, tagged with its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SearchHit {
    Docs(DocResult),
    Github(FileResult),
    Patterns(PatternResult),
}

impl SearchHit {
    pub fn score(&self) -> u32 {
        match self {
            Self::Docs(r) => r.score,
            Self::Github(r) => r.score,
            Self::Patterns(r) => r.score,
        }
    }

    pub fn source(&self) -> SearchSource {
        match self {
            Self::Docs(_) => SearchSource::Docs,
            Self::Github(_) => SearchSource::Github,
            Self::Patterns(_) => SearchSource::Patterns,
        }
    }
}

/// Per-source outcome of a combined search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub source: SearchSource,
    /// Hits the source contributed before merging
    pub hits: usize,
    /// Set when the source could not be searched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchError>,
}

/// Result of [`SearchEngine::search_all`](crate::search::SearchEngine::search_all)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedResults {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub sources: Vec<SourceStatus>,
}

/// A topic example with the topic it was found under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleHit {
    pub topic: String,
    #[serde(flatten)]
    pub example: TopicExample,
}

/// Result of a topic search over repository examples
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleResults {
    pub query: String,
    pub matched_topics: Vec<String>,
    pub examples: Vec<ExampleHit>,
    /// Every known topic, sorted; filled only when nothing matched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_topics: Vec<String>,
}
