//! Corpus record types shared by the crawler, the repository walker, the
//! analyzer, storage and search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ===== Documentation corpus =====

/// A heading in a documentation page outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// A code block lifted out of a documentation page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub code: String,
    pub language: String,
    /// Text of the nearest preceding heading (or the page title)
    pub context: String,
}

/// A successfully fetched, non-empty documentation page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub url: String,
    pub title: String,
    pub content: String,
    pub headings: Vec<Heading>,
    pub code_examples: Vec<CodeExample>,
    pub crawled_at: DateTime<Utc>,
}

/// Maximum number of content characters kept in a [`DocIndexEntry`]
pub const INDEX_EXCERPT_CHARS: usize = 500;

/// Reduced variant of a [`Document`] for quick listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocIndexEntry {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub headings: Vec<String>,
    pub code_example_count: usize,
    pub crawled_at: DateTime<Utc>,
}

impl From<&Document> for DocIndexEntry {
    fn from(doc: &Document) -> Self {
        Self {
            url: doc.url.clone(),
            title: doc.title.clone(),
            excerpt: doc.content.chars().take(INDEX_EXCERPT_CHARS).collect(),
            headings: doc.headings.iter().map(|h| h.text.clone()).collect(),
            code_example_count: doc.code_examples.len(),
            crawled_at: doc.crawled_at,
        }
    }
}

/// Summary of the last completed documentation crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    pub total_docs: usize,
    pub total_code_examples: usize,
    pub urls_crawled: usize,
    pub base_urls: Vec<String>,
    pub crawl_date: DateTime<Utc>,
    #[serde(default)]
    pub final_state: String,
    #[serde(default)]
    pub failures: usize,
    /// When each seed was last actually crawled
    #[serde(default)]
    pub seed_crawled_at: BTreeMap<String, DateTime<Utc>>,
}

impl CrawlStats {
    /// Returns when `seed` was last crawled, if it ever was
    pub fn last_crawled(&self, seed: &str) -> Option<DateTime<Utc>> {
        self.seed_crawled_at.get(seed).copied().or_else(|| {
            self.base_urls
                .iter()
                .any(|base| base == seed)
                .then_some(self.crawl_date)
        })
    }
}

// ===== Repository corpus =====

/// Metadata for one harvested repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDescriptor {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub url: String,
    pub language: Option<String>,
    pub default_branch: Option<String>,
    /// Set when the metadata lookup failed and this descriptor is degraded
    pub fetch_error: Option<String>,
}

/// Closed classification of a repository file, assigned from its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Source,
    ProjectConfig,
    PackageConfig,
    Readme,
    License,
    Changelog,
    Documentation,
    Example,
    WebIndex,
    WebContent,
    Config,
    Markdown,
    Text,
    Other,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::ProjectConfig => "project-config",
            Self::PackageConfig => "package-config",
            Self::Readme => "readme",
            Self::License => "license",
            Self::Changelog => "changelog",
            Self::Documentation => "documentation",
            Self::Example => "example",
            Self::WebIndex => "web-index",
            Self::WebContent => "web-content",
            Self::Config => "config",
            Self::Markdown => "markdown",
            Self::Text => "text",
            Self::Other => "other",
        }
    }

    /// Returns true for HTML pages (which get the extra HTML topic pass)
    pub fn is_html(&self) -> bool {
        matches!(self, Self::WebIndex | Self::WebContent)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file pulled out of a repository tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFile {
    /// `owner/name` of the repository
    pub repository: String,
    pub path: String,
    pub size: u64,
    pub content: String,
    pub file_type: FileType,
    pub url: String,
    pub extracted_at: DateTime<Utc>,
}

/// One structural match (import, function, struct or enum) in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub definition: String,
    pub path: String,
    pub repository: String,
    pub url: String,
}

/// Aggregate pattern records across all analysed files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternIndex {
    pub imports: Vec<PatternRecord>,
    pub functions: Vec<PatternRecord>,
    pub structs: Vec<PatternRecord>,
    pub enums: Vec<PatternRecord>,
}

impl PatternIndex {
    pub fn total(&self) -> usize {
        self.imports.len() + self.functions.len() + self.structs.len() + self.enums.len()
    }

    /// Iterates over every record with its kind label
    pub fn iter_all(&self) -> impl Iterator<Item = (&'static str, &PatternRecord)> {
        self.imports
            .iter()
            .map(|r| ("import", r))
            .chain(self.functions.iter().map(|r| ("function", r)))
            .chain(self.structs.iter().map(|r| ("struct", r)))
            .chain(self.enums.iter().map(|r| ("enum", r)))
    }
}

/// Complexity tier of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Simple,
    Intermediate,
    Advanced,
}

/// A reference to a file filed under a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicExample {
    pub repository: String,
    pub path: String,
    pub url: String,
    pub file_type: FileType,
    pub complexity: Option<ComplexityTier>,
    pub preview: String,
}

/// Topic name to the examples tagged with it
pub type TopicIndex = BTreeMap<String, Vec<TopicExample>>;

/// Per-file analysis outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub repository: String,
    pub path: String,
    pub complexity: Option<ComplexityTier>,
    pub complexity_score: Option<usize>,
    pub topics: Vec<String>,
}

/// File type to number of harvested files of that type
pub type FileTypeBreakdown = BTreeMap<FileType, usize>;
