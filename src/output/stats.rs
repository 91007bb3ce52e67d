//! Statistics over the persisted corpora
//!
//! This module summarises what the crawler and the repository harvester
//! have written to the data directory. Corpora that were never written
//! count as empty.

use crate::storage::{Storage, StorageResult};
use crate::types::{CrawlStats, FileTypeBreakdown};
use chrono::{DateTime, Utc};

/// Corpus statistics summary
#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    /// Number of documentation pages stored
    pub total_docs: usize,

    /// Code examples across all documentation pages
    pub total_code_examples: usize,

    /// When the last crawl finished, if any crawl has
    pub crawl_date: Option<DateTime<Utc>>,

    /// Final state of the last crawl
    pub crawl_state: Option<String>,

    /// Fetch failures recorded by the last crawl
    pub crawl_failures: usize,

    /// Seed URLs of the last crawl
    pub base_urls: Vec<String>,

    /// Repository descriptors stored
    pub repositories: usize,

    /// Repositories whose metadata lookup failed
    pub degraded_repositories: usize,

    /// Repository files stored
    pub total_files: usize,

    /// File counts per file type
    pub files_by_type: FileTypeBreakdown,

    /// Number of distinct topics
    pub topics: usize,

    pub imports: usize,
    pub functions: usize,
    pub structs: usize,
    pub enums: usize,
}

impl CorpusStatistics {
    /// Total extracted patterns of every kind
    pub fn total_patterns(&self) -> usize {
        self.imports + self.functions + self.structs + self.enums
    }
}

/// Treats a corpus that was never written as its empty value
fn or_empty<T: Default>(result: StorageResult<T>) -> StorageResult<T> {
    match result {
        Err(e) if e.is_not_found() => Ok(T::default()),
        other => other,
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to read
///
/// # Returns
///
/// * `Ok(CorpusStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - A corpus exists but could not be read
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CorpusStatistics> {
    let mut stats = CorpusStatistics::default();

    // Prefer the crawl stats record; fall back to counting the documents
    match storage.load_crawl_stats()? {
        Some(CrawlStats {
            total_docs,
            total_code_examples,
            base_urls,
            crawl_date,
            final_state,
            failures,
            ..
        }) => {
            stats.total_docs = total_docs;
            stats.total_code_examples = total_code_examples;
            stats.base_urls = base_urls;
            stats.crawl_date = Some(crawl_date);
            stats.crawl_state = Some(final_state);
            stats.crawl_failures = failures;
        }
        None => {
            let documents = or_empty(storage.load_documents())?;
            stats.total_docs = documents.len();
            stats.total_code_examples = documents.iter().map(|d| d.code_examples.len()).sum();
        }
    }

    let repositories = or_empty(storage.load_repositories())?;
    stats.repositories = repositories.len();
    stats.degraded_repositories = repositories
        .iter()
        .filter(|r| r.fetch_error.is_some())
        .count();

    stats.files_by_type = or_empty(storage.load_file_types())?;
    stats.total_files = stats.files_by_type.values().sum();

    stats.topics = or_empty(storage.load_topics())?.len();

    let patterns = or_empty(storage.load_patterns())?;
    stats.imports = patterns.imports.len();
    stats.functions = patterns.functions.len();
    stats.structs = patterns.structs.len();
    stats.enums = patterns.enums.len();

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    println!("Documentation:");
    println!("  Pages: {}", stats.total_docs);
    println!("  Code examples: {}", stats.total_code_examples);
    match (&stats.crawl_date, &stats.crawl_state) {
        (Some(date), Some(state)) => {
            println!("  Last crawl: {} ({})", date.to_rfc3339(), state);
            println!("  Fetch failures: {}", stats.crawl_failures);
        }
        _ => println!("  Last crawl: never"),
    }
    for url in &stats.base_urls {
        println!("    * {}", url);
    }
    println!();

    println!("Repositories:");
    println!("  Repositories: {}", stats.repositories);
    if stats.degraded_repositories > 0 {
        println!("  Degraded (metadata missing): {}", stats.degraded_repositories);
    }
    println!("  Files: {}", stats.total_files);
    println!();

    if !stats.files_by_type.is_empty() {
        println!("Files by Type:");
        let mut type_counts: Vec<_> = stats.files_by_type.iter().collect();
        type_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (file_type, count) in type_counts {
            let percentage = if stats.total_files > 0 {
                (*count as f64 / stats.total_files as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", file_type.as_str(), count, percentage);
        }
        println!();
    }

    println!("Patterns ({}):", stats.total_patterns());
    println!("  Imports: {}", stats.imports);
    println!("  Functions: {}", stats.functions);
    println!("  Structs: {}", stats.structs);
    println!("  Enums: {}", stats.enums);
    println!();

    println!("Topics: {}", stats.topics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonStorage;
    use crate::types::{FileType, PatternIndex, PatternRecord, RepositoryDescriptor};
    use tempfile::TempDir;

    fn descriptor(full_name: &str, fetch_error: Option<&str>) -> RepositoryDescriptor {
        let (owner, name) = full_name.split_once('/').unwrap();
        RepositoryDescriptor {
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: full_name.to_string(),
            description: None,
            stars: 0,
            url: format!("https://github.com/{}", full_name),
            language: None,
            default_branch: None,
            fetch_error: fetch_error.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_data_dir_is_all_zero() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_docs, 0);
        assert_eq!(stats.repositories, 0);
        assert_eq!(stats.total_patterns(), 0);
        assert!(stats.crawl_date.is_none());
    }

    #[test]
    fn test_repository_corpus_counts() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).unwrap();

        storage
            .save_repositories(&[
                descriptor("onyx-lang/onyx", None),
                descriptor("onyx-lang/missing", Some("HTTP 404")),
            ])
            .unwrap();

        let mut types = FileTypeBreakdown::new();
        types.insert(FileType::Source, 3);
        types.insert(FileType::Readme, 1);
        storage.save_file_types(&types).unwrap();

        let record = PatternRecord {
            definition: "use core.io".to_string(),
            path: "main.onyx".to_string(),
            repository: "onyx-lang/onyx".to_string(),
            url: String::new(),
        };
        let patterns = PatternIndex {
            imports: vec![record.clone(), record],
            ..PatternIndex::default()
        };
        storage.save_patterns(&patterns).unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.repositories, 2);
        assert_eq!(stats.degraded_repositories, 1);
        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.imports, 2);
        assert_eq!(stats.total_patterns(), 2);
        assert_eq!(stats.topics, 0);
    }

    #[test]
    fn test_corrupt_corpus_is_an_error() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("github/topics.json"), "{ torn").unwrap();

        assert!(load_statistics(&storage).is_err());
    }
}
