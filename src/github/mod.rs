//! Repository harvesting from a code-hosting API
//!
//! # Components
//!
//! - `RepositoryRef`: parses the reference forms accepted in config
//! - `GithubClient`: metadata, recursive tree and blob calls
//! - `classify_file_type`: first-match file-type rules
//! - `RepositoryWalker`: walks repositories and persists the repository corpus

mod classify;
mod client;
mod reference;
mod walker;

pub use classify::{classify_file_type, is_vendored, should_include};
pub use client::{decode_blob, GithubClient, RepositoryMetadata, TreeEntry};
pub use reference::RepositoryRef;
pub use walker::{HarvestReport, RepositoryWalker, WalkOutput};

use crate::config::Config;
use crate::storage::open_storage;
use crate::HarvestError;
use std::path::Path;
use thiserror::Error;

/// Errors talking to the repository host
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Invalid repository reference: {0}")]
    InvalidReference(String),
}

/// Harvests every configured repository into the data directory
///
/// # Arguments
///
/// * `config` - The loaded configuration
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Repository corpus written
/// * `Err(HarvestError)` - Storage could not be opened or written
pub async fn harvest(config: &Config) -> Result<HarvestReport, HarvestError> {
    let mut storage = open_storage(Path::new(&config.output.data_dir))?;
    let walker = RepositoryWalker::new(config)?;
    walker.run(&mut storage).await
}
