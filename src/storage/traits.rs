//! Storage traits and error types
//!
//! This module defines the trait interface for corpus backends and
//! associated error types.

use crate::storage::schema::Collection;
use crate::types::{
    CrawlStats, DocIndexEntry, Document, FileAnalysis, FileTypeBreakdown, PatternIndex,
    RepositoryDescriptor, RepositoryFile, TopicIndex,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corpus '{0}' is not available yet, populate data first")]
    NotFound(String),

    #[error("Corpus '{collection}' is corrupt or mid-write: {message}")]
    Corrupt { collection: String, message: String },

    #[error("Corpus '{collection}' has unsupported format version {found}")]
    UnsupportedFormat { collection: String, found: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Returns true when the corpus simply has not been written yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for corpus backend implementations
///
/// Every save replaces the whole collection. Loads of a collection that was
/// never written fail with [`StorageError::NotFound`].
pub trait Storage {
    // ===== Documentation Corpus =====

    /// Replaces the full documents collection
    fn save_documents(&mut self, documents: &[Document]) -> StorageResult<()>;

    fn load_documents(&self) -> StorageResult<Vec<Document>>;

    /// Replaces the reduced documents index
    fn save_doc_index(&mut self, entries: &[DocIndexEntry]) -> StorageResult<()>;

    fn load_doc_index(&self) -> StorageResult<Vec<DocIndexEntry>>;

    /// Overwrites the crawl stats record
    fn save_crawl_stats(&mut self, stats: &CrawlStats) -> StorageResult<()>;

    /// Loads the last crawl stats, or `None` if no crawl has completed
    fn load_crawl_stats(&self) -> StorageResult<Option<CrawlStats>>;

    // ===== Repository Corpus =====

    fn save_repositories(&mut self, repositories: &[RepositoryDescriptor]) -> StorageResult<()>;

    fn load_repositories(&self) -> StorageResult<Vec<RepositoryDescriptor>>;

    fn save_repository_files(&mut self, files: &[RepositoryFile]) -> StorageResult<()>;

    fn load_repository_files(&self) -> StorageResult<Vec<RepositoryFile>>;

    fn save_patterns(&mut self, patterns: &PatternIndex) -> StorageResult<()>;

    fn load_patterns(&self) -> StorageResult<PatternIndex>;

    fn save_topics(&mut self, topics: &TopicIndex) -> StorageResult<()>;

    fn load_topics(&self) -> StorageResult<TopicIndex>;

    fn save_file_analysis(&mut self, analysis: &[FileAnalysis]) -> StorageResult<()>;

    fn load_file_analysis(&self) -> StorageResult<Vec<FileAnalysis>>;

    fn save_file_types(&mut self, breakdown: &FileTypeBreakdown) -> StorageResult<()>;

    fn load_file_types(&self) -> StorageResult<FileTypeBreakdown>;

    // ===== Metadata =====

    /// Returns the generation of a collection, or `None` if it was never written
    fn generation(&self, collection: Collection) -> StorageResult<Option<u64>>;
}
