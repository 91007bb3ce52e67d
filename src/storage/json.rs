//! Flat JSON storage implementation
//!
//! Each collection lives in its own file under the data directory, wrapped in
//! a [`CorpusEnvelope`]. Writes go to a sibling temp file that is renamed over
//! the target so readers never observe a half-written collection.

use crate::storage::schema::{Collection, CorpusEnvelope, EnvelopeHeader};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::types::{
    CrawlStats, DocIndexEntry, Document, FileAnalysis, FileTypeBreakdown, PatternIndex,
    RepositoryDescriptor, RepositoryFile, TopicIndex,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON file storage backend
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Creates a storage rooted at `root`
    ///
    /// # Arguments
    ///
    /// * `root` - Data directory; `docs/` and `github/` are created beneath it
    ///
    /// # Returns
    ///
    /// * `Ok(JsonStorage)` - Directory layout exists
    /// * `Err(StorageError)` - Directories could not be created
    pub fn new(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root.join("docs"))?;
        fs::create_dir_all(root.join("github"))?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Opens a storage for reading without touching the filesystem
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a collection file
    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.relative_path())
    }

    fn write_collection<T: Serialize + ?Sized>(
        &self,
        collection: Collection,
        items: &T,
    ) -> StorageResult<()> {
        let path = self.path_for(collection);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let generation = self.generation(collection)?.map_or(1, |g| g + 1);
        let envelope = CorpusEnvelope::seal(collection, generation, items)?;
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(
            "Wrote {} generation {} to {}",
            collection,
            generation,
            path.display()
        );
        Ok(())
    }

    fn read_collection<T: DeserializeOwned>(&self, collection: Collection) -> StorageResult<T> {
        let path = self.path_for(collection);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(collection.name().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: CorpusEnvelope =
            serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
                collection: collection.name().to_string(),
                message: e.to_string(),
            })?;

        envelope.open(collection)
    }
}

impl Storage for JsonStorage {
    // ===== Documentation Corpus =====

    fn save_documents(&mut self, documents: &[Document]) -> StorageResult<()> {
        self.write_collection(Collection::Documents, documents)
    }

    fn load_documents(&self) -> StorageResult<Vec<Document>> {
        self.read_collection(Collection::Documents)
    }

    fn save_doc_index(&mut self, entries: &[DocIndexEntry]) -> StorageResult<()> {
        self.write_collection(Collection::DocIndex, entries)
    }

    fn load_doc_index(&self) -> StorageResult<Vec<DocIndexEntry>> {
        self.read_collection(Collection::DocIndex)
    }

    fn save_crawl_stats(&mut self, stats: &CrawlStats) -> StorageResult<()> {
        self.write_collection(Collection::CrawlStats, stats)
    }

    fn load_crawl_stats(&self) -> StorageResult<Option<CrawlStats>> {
        match self.read_collection(Collection::CrawlStats) {
            Ok(stats) => Ok(Some(stats)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ===== Repository Corpus =====

    fn save_repositories(&mut self, repositories: &[RepositoryDescriptor]) -> StorageResult<()> {
        self.write_collection(Collection::Repositories, repositories)
    }

    fn load_repositories(&self) -> StorageResult<Vec<RepositoryDescriptor>> {
        self.read_collection(Collection::Repositories)
    }

    fn save_repository_files(&mut self, files: &[RepositoryFile]) -> StorageResult<()> {
        self.write_collection(Collection::RepositoryFiles, files)
    }

    fn load_repository_files(&self) -> StorageResult<Vec<RepositoryFile>> {
        self.read_collection(Collection::RepositoryFiles)
    }

    fn save_patterns(&mut self, patterns: &PatternIndex) -> StorageResult<()> {
        self.write_collection(Collection::Patterns, patterns)
    }

    fn load_patterns(&self) -> StorageResult<PatternIndex> {
        self.read_collection(Collection::Patterns)
    }

    fn save_topics(&mut self, topics: &TopicIndex) -> StorageResult<()> {
        self.write_collection(Collection::Topics, topics)
    }

    fn load_topics(&self) -> StorageResult<TopicIndex> {
        self.read_collection(Collection::Topics)
    }

    fn save_file_analysis(&mut self, analysis: &[FileAnalysis]) -> StorageResult<()> {
        self.write_collection(Collection::FileAnalysis, analysis)
    }

    fn load_file_analysis(&self) -> StorageResult<Vec<FileAnalysis>> {
        self.read_collection(Collection::FileAnalysis)
    }

    fn save_file_types(&mut self, breakdown: &FileTypeBreakdown) -> StorageResult<()> {
        self.write_collection(Collection::FileTypes, breakdown)
    }

    fn load_file_types(&self) -> StorageResult<FileTypeBreakdown> {
        self.read_collection(Collection::FileTypes)
    }

    // ===== Metadata =====

    fn generation(&self, collection: Collection) -> StorageResult<Option<u64>> {
        let path = self.path_for(collection);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // An unreadable header is overwritten from generation 1
        match serde_json::from_str::<EnvelopeHeader>(&content) {
            Ok(header) => Ok(Some(header.generation)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable header of {}: {}", collection, e);
                Ok(None)
            }
        }
    }
}
