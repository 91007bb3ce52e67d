//! Storage module for persisting the harvested corpora
//!
//! This module handles all on-disk persistence, including:
//! - The documentation corpus (documents, reduced index, crawl stats)
//! - The repository corpus (descriptors, files, patterns, topics, analysis)
//! - Envelope generations and checksums for every collection

mod json;
mod schema;
mod traits;

pub use json::JsonStorage;
pub use schema::{Collection, CorpusEnvelope, CORPUS_FORMAT};
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens the corpus directory
///
/// # Arguments
///
/// * `path` - Data directory from the `[output]` section
///
/// # Returns
///
/// * `Ok(JsonStorage)` - Storage ready for reads and writes
/// * `Err(StorageError)` - Directory layout could not be created
pub fn open_storage(path: &Path) -> StorageResult<JsonStorage> {
    JsonStorage::new(path)
}
