//! Corpus layout and the on-disk envelope wrapping every collection

use crate::storage::traits::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Current envelope format version
pub const CORPUS_FORMAT: u32 = 1;

/// The flat collections making up the persisted corpora
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    // Documentation corpus
    Documents,
    DocIndex,
    CrawlStats,

    // Repository corpus
    Repositories,
    RepositoryFiles,
    Patterns,
    Topics,
    FileAnalysis,
    FileTypes,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Self::Documents,
        Self::DocIndex,
        Self::CrawlStats,
        Self::Repositories,
        Self::RepositoryFiles,
        Self::Patterns,
        Self::Topics,
        Self::FileAnalysis,
        Self::FileTypes,
    ];

    /// Path of the collection file relative to the data directory
    pub fn relative_path(&self) -> &'static str {
        match self {
            Self::Documents => "docs/documents.json",
            Self::DocIndex => "docs/doc_index.json",
            Self::CrawlStats => "docs/crawl_stats.json",
            Self::Repositories => "github/repositories.json",
            Self::RepositoryFiles => "github/files.json",
            Self::Patterns => "github/patterns.json",
            Self::Topics => "github/topics.json",
            Self::FileAnalysis => "github/file_analysis.json",
            Self::FileTypes => "github/file_types.json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::DocIndex => "doc_index",
            Self::CrawlStats => "crawl_stats",
            Self::Repositories => "repositories",
            Self::RepositoryFiles => "files",
            Self::Patterns => "patterns",
            Self::Topics => "topics",
            Self::FileAnalysis => "file_analysis",
            Self::FileTypes => "file_types",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wrapper written around each collection
///
/// `generation` increases by one on every write of the same collection and
/// `checksum` is the SHA-256 of the serialized `items`; a reader that sees a
/// mismatch is looking at a torn or foreign file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEnvelope {
    pub format: u32,
    pub kind: String,
    pub generation: u64,
    pub written_at: DateTime<Utc>,
    pub checksum: String,
    pub items: serde_json::Value,
}

/// Just the header fields, for reading a generation without the payload
#[derive(Debug, Deserialize)]
pub struct EnvelopeHeader {
    pub generation: u64,
}

impl CorpusEnvelope {
    /// Wraps `items` for `collection` at the given generation
    pub fn seal<T: Serialize + ?Sized>(
        collection: Collection,
        generation: u64,
        items: &T,
    ) -> StorageResult<Self> {
        let items = serde_json::to_value(items)?;
        let checksum = checksum(&items)?;

        Ok(Self {
            format: CORPUS_FORMAT,
            kind: collection.name().to_string(),
            generation,
            written_at: Utc::now(),
            checksum,
            items,
        })
    }

    /// Verifies the envelope belongs to `collection` and is intact, then decodes it
    pub fn open<T: DeserializeOwned>(self, collection: Collection) -> StorageResult<T> {
        if self.format != CORPUS_FORMAT {
            return Err(StorageError::UnsupportedFormat {
                collection: collection.name().to_string(),
                found: self.format,
            });
        }

        if self.kind != collection.name() {
            return Err(StorageError::Corrupt {
                collection: collection.name().to_string(),
                message: format!("envelope holds '{}'", self.kind),
            });
        }

        let actual = checksum(&self.items)?;
        if actual != self.checksum {
            return Err(StorageError::Corrupt {
                collection: collection.name().to_string(),
                message: format!(
                    "checksum mismatch at generation {} (expected {}, found {})",
                    self.generation, self.checksum, actual
                ),
            });
        }

        Ok(serde_json::from_value(self.items)?)
    }
}

/// Hex SHA-256 of the compact serialization of `value`
fn checksum(value: &serde_json::Value) -> StorageResult<String> {
    let serialized = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
