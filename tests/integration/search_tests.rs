//! Integration tests for corpus search

use crate::common::{create_test_config, html};
use chrono::Utc;
use onyx_harvest::crawler::crawl;
use onyx_harvest::search::{open_engine, SearchError, SearchHit, SearchSource};
use onyx_harvest::storage::{JsonStorage, Storage};
use onyx_harvest::types::{Document, FileType, Heading, RepositoryFile};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

fn document(slug: &str, title: &str, content: &str) -> Document {
    Document {
        url: format!("https://docs.onyxlang.io/book/{}.html", slug),
        title: title.to_string(),
        content: content.to_string(),
        headings: vec![Heading {
            level: 1,
            text: title.to_string(),
        }],
        code_examples: Vec::new(),
        crawled_at: Utc::now(),
    }
}

fn file(path: &str, content: &str) -> RepositoryFile {
    RepositoryFile {
        repository: "onyx-lang/onyx".to_string(),
        path: path.to_string(),
        size: content.len() as u64,
        content: content.to_string(),
        file_type: FileType::Source,
        url: format!("https://github.com/onyx-lang/onyx/blob/main/{}", path),
        extracted_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_search_over_crawled_docs() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/book/index.html"))
        .respond_with(html(
            r#"<html><body><main><h1>Overview</h1><p>Start with memory.</p><a href="allocators.html">Allocators</a></main></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/allocators.html"))
        .respond_with(html(
            r#"<html><body><main><h1>Allocators</h1><p>Use the heap allocator for dynamic memory</p></main></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    crawl(&config, false).await.expect("crawl failed");

    let engine = open_engine(data_dir.path());
    let results = engine.search_docs("allocator", 10).unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].url.ends_with("/book/allocators.html"));
    assert!(results[0].snippet.to_lowercase().contains("allocator"));
    // Title, heading and body all match on the allocators page
    assert_eq!(results[0].score, 16);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.iter().all(|r| r.score > 0));
}

#[test]
fn test_allocators_document_scores_from_title_and_content() {
    let data_dir = TempDir::new().unwrap();
    let mut storage = JsonStorage::new(data_dir.path()).unwrap();
    storage
        .save_documents(&[
            document(
                "allocators",
                "Allocators",
                "Use the heap allocator for dynamic memory",
            ),
            document("strings", "Strings", "Strings are slices of bytes"),
        ])
        .unwrap();

    let engine = open_engine(data_dir.path());
    let results = engine.search_docs("allocator", 10).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Allocators");
    assert!(results[0].score > 10);
    assert!(results[0].snippet.contains("allocator"));
}

#[test]
fn test_search_all_respects_limit() {
    let data_dir = TempDir::new().unwrap();
    let mut storage = JsonStorage::new(data_dir.path()).unwrap();

    let documents: Vec<Document> = (0..8)
        .map(|i| {
            document(
                &format!("net{}", i),
                &format!("Networking {}", i),
                "Sockets and networking",
            )
        })
        .collect();
    storage.save_documents(&documents).unwrap();

    let files: Vec<RepositoryFile> = (0..8)
        .map(|i| file(&format!("core/net/net{}.onyx", i), "use core.net\n"))
        .collect();
    storage.save_repository_files(&files).unwrap();

    let engine = open_engine(data_dir.path());
    let combined = engine.search_all("net", &[SearchSource::Docs, SearchSource::Github], 5);

    assert!(combined.results.len() <= 5);
    assert!(!combined.results.is_empty());
    assert!(combined
        .results
        .windows(2)
        .all(|w| w[0].score() >= w[1].score()));
    assert!(combined
        .results
        .iter()
        .all(|hit| !matches!(hit, SearchHit::Patterns(_))));
    assert!(combined.sources.iter().all(|s| s.error.is_none()));
}

#[test]
fn test_search_before_any_harvest() {
    let data_dir = TempDir::new().unwrap();
    let engine = open_engine(&data_dir.path().join("never-written"));

    let err = engine.search_docs("allocator", 5).unwrap_err();
    assert!(matches!(err, SearchError::Unavailable { .. }));

    let combined = engine.search_all("allocator", &[], 5);
    assert!(combined.results.is_empty());
    assert_eq!(combined.sources.len(), 3);
    assert!(combined.sources.iter().all(|s| s.error.is_some()));

    // Searching never creates the data directory
    assert!(!data_dir.path().join("never-written").exists());
}
