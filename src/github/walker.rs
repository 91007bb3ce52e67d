//! Repository tree walker
//!
//! For each configured repository: look up metadata, list the whole tree in
//! one recursive call, keep the entries the file-type rules accept, and fetch
//! their blobs one at a time with a fixed pause in between.

use crate::analysis::PatternAnalyzer;
use crate::config::{Config, GithubConfig};
use crate::github::classify::{classify_file_type, should_include};
use crate::github::client::{GithubClient, RepositoryMetadata, TreeEntry};
use crate::github::reference::RepositoryRef;
use crate::storage::Storage;
use crate::types::{RepositoryDescriptor, RepositoryFile};
use crate::HarvestError;
use chrono::Utc;
use std::time::Duration;

/// Everything collected by one walk
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    pub repositories: Vec<RepositoryDescriptor>,
    pub files: Vec<RepositoryFile>,
    /// References that could not be parsed
    pub invalid_references: Vec<String>,
    /// Entries skipped for exceeding the size cap
    pub skipped_oversize: usize,
    /// Entries whose blob could not be fetched or decoded
    pub dropped_files: usize,
}

/// Outcome of [`RepositoryWalker::run`]
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub repositories: usize,
    /// Repositories whose metadata lookup failed
    pub degraded: usize,
    pub files: usize,
    pub skipped_oversize: usize,
    pub dropped_files: usize,
    pub invalid_references: Vec<String>,
    pub patterns: usize,
    pub topics: usize,
}

/// Walks configured repositories and builds the repository corpus
pub struct RepositoryWalker {
    client: GithubClient,
    config: GithubConfig,
}

impl RepositoryWalker {
    /// Creates a walker from the loaded configuration
    ///
    /// # Returns
    ///
    /// * `Ok(RepositoryWalker)` - Ready to walk
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = GithubClient::new(
            &config.github,
            &config.user_agent,
            config.crawler.timeout_secs,
        )?;

        Ok(Self::with_client(client, config.github.clone()))
    }

    pub fn with_client(client: GithubClient, config: GithubConfig) -> Self {
        Self { client, config }
    }

    /// Walks every configured repository, analyses the files and persists
    /// the repository corpus
    ///
    /// # Arguments
    ///
    /// * `storage` - Destination for the repository corpus
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - Corpus written (possibly with degraded entries)
    /// * `Err(HarvestError)` - Persisting failed
    pub async fn run<S: Storage>(&self, storage: &mut S) -> Result<HarvestReport, HarvestError> {
        let walked = self.walk(&self.config.repositories).await;
        let analysis = PatternAnalyzer::new().analyze(&walked.files);

        storage.save_repositories(&walked.repositories)?;
        storage.save_repository_files(&walked.files)?;
        storage.save_patterns(&analysis.patterns)?;
        storage.save_topics(&analysis.topics)?;
        storage.save_file_analysis(&analysis.file_analysis)?;
        storage.save_file_types(&analysis.file_types)?;

        let report = HarvestReport {
            repositories: walked.repositories.len(),
            degraded: walked
                .repositories
                .iter()
                .filter(|r| r.fetch_error.is_some())
                .count(),
            files: walked.files.len(),
            skipped_oversize: walked.skipped_oversize,
            dropped_files: walked.dropped_files,
            invalid_references: walked.invalid_references,
            patterns: analysis.patterns.total(),
            topics: analysis.topics.len(),
        };

        tracing::info!(
            "Harvested {} files from {} repositories ({} patterns, {} topics)",
            report.files,
            report.repositories,
            report.patterns,
            report.topics
        );

        Ok(report)
    }

    /// Walks a list of repository references
    ///
    /// Malformed references are dropped with a warning; a pause of
    /// `repo-delay-ms` separates consecutive repositories.
    pub async fn walk(&self, references: &[String]) -> WalkOutput {
        let mut output = WalkOutput::default();
        let mut walked_any = false;

        for raw in references {
            let repository = match RepositoryRef::parse(raw) {
                Ok(repository) => repository,
                Err(e) => {
                    tracing::warn!("Dropping repository reference: {}", e);
                    output.invalid_references.push(raw.clone());
                    continue;
                }
            };

            if walked_any {
                pause(self.config.repo_delay_ms).await;
            }
            walked_any = true;

            self.walk_repository(&repository, &mut output).await;
        }

        output
    }

    /// Walks one repository, appending its descriptor and files to `output`
    pub async fn walk_repository(&self, repository: &RepositoryRef, output: &mut WalkOutput) {
        tracing::info!("Walking repository {}", repository);

        let descriptor = match self.client.repository(repository).await {
            Ok(metadata) => descriptor_from_metadata(repository, metadata),
            Err(e) => {
                tracing::warn!("Metadata lookup failed for {}: {}", repository, e);
                self.degraded_descriptor(repository, e.to_string())
            }
        };

        let branch = descriptor
            .default_branch
            .clone()
            .unwrap_or_else(|| "HEAD".to_string());
        let full_name = descriptor.full_name.clone();
        output.repositories.push(descriptor);

        let tree = match self.client.tree(repository, &branch).await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Tree listing failed for {}: {}", repository, e);
                return;
            }
        };

        let entries: Vec<TreeEntry> = tree
            .into_iter()
            .filter(|entry| entry.is_blob() && should_include(&entry.path))
            .take(self.config.max_files_per_repo)
            .collect();

        tracing::debug!("{}: {} candidate files", repository, entries.len());

        let mut fetched_any = false;
        for entry in entries {
            if entry.size.is_some_and(|size| size > self.config.max_file_size) {
                tracing::debug!("Skipping {} ({} bytes over cap)", entry.path, entry.size.unwrap_or(0));
                output.skipped_oversize += 1;
                continue;
            }

            if fetched_any {
                pause(self.config.blob_delay_ms).await;
            }
            fetched_any = true;

            let content = match self.client.blob(repository, &entry.sha, &entry.path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Dropping {}:{}: {}", repository, entry.path, e);
                    output.dropped_files += 1;
                    continue;
                }
            };

            // Lossy decoding can grow the content past the listed size
            if content.len() as u64 > self.config.max_file_size {
                tracing::debug!("Skipping {} ({} bytes decoded, over cap)", entry.path, content.len());
                output.skipped_oversize += 1;
                continue;
            }
            let size = entry.size.unwrap_or(content.len() as u64);

            output.files.push(RepositoryFile {
                repository: full_name.clone(),
                file_type: classify_file_type(&entry.path),
                url: format!(
                    "{}/{}/blob/{}/{}",
                    self.config.web_base.trim_end_matches('/'),
                    full_name,
                    branch,
                    entry.path
                ),
                path: entry.path,
                size,
                content,
                extracted_at: Utc::now(),
            });
        }
    }

    fn degraded_descriptor(&self, repository: &RepositoryRef, error: String) -> RepositoryDescriptor {
        RepositoryDescriptor {
            owner: repository.owner.clone(),
            name: repository.name.clone(),
            full_name: repository.full_name(),
            description: None,
            stars: 0,
            url: format!(
                "{}/{}",
                self.config.web_base.trim_end_matches('/'),
                repository.full_name()
            ),
            language: None,
            default_branch: None,
            fetch_error: Some(error),
        }
    }
}

fn descriptor_from_metadata(
    repository: &RepositoryRef,
    metadata: RepositoryMetadata,
) -> RepositoryDescriptor {
    RepositoryDescriptor {
        owner: repository.owner.clone(),
        name: repository.name.clone(),
        full_name: metadata.full_name,
        description: metadata.description,
        stars: metadata.stargazers_count,
        url: metadata.html_url,
        language: metadata.language,
        default_branch: metadata.default_branch,
        fetch_error: None,
    }
}

async fn pause(millis: u64) {
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_metadata() {
        let repository = RepositoryRef::parse("onyx-lang/onyx").unwrap();
        let metadata: RepositoryMetadata = serde_json::from_str(
            r#"{
                "full_name": "onyx-lang/onyx",
                "description": "The Onyx programming language",
                "stargazers_count": 120,
                "html_url": "https://github.com/onyx-lang/onyx",
                "language": "C",
                "default_branch": "master"
            }"#,
        )
        .unwrap();

        let descriptor = descriptor_from_metadata(&repository, metadata);
        assert_eq!(descriptor.stars, 120);
        assert_eq!(descriptor.default_branch.as_deref(), Some("master"));
        assert!(descriptor.fetch_error.is_none());
    }
}
