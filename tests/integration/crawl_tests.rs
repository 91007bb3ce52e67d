//! Integration tests for the documentation crawler

use crate::common::{create_test_config, html};
use chrono::{Duration, Utc};
use onyx_harvest::config::SiteEntry;
use onyx_harvest::crawler::{crawl, DocCrawler};
use onyx_harvest::storage::{Collection, JsonStorage, Storage};
use onyx_harvest::types::{CrawlStats, Document};
use onyx_harvest::CrawlState;
use std::collections::{BTreeMap, HashSet};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PAGE: &str = r#"<html>
<head><title>Onyx Book</title></head>
<body>
  <nav><a href="/book/packages.html">Packages</a></nav>
  <main>
    <h1>Overview</h1>
    <p>Welcome to the Onyx book.</p>
    <a href="allocators.html">Allocators</a>
    <a href="/book/packages.html#install">Packages</a>
    <a href="allocators.html?">Allocators again</a>
    <a href="/blog/post.html">Blog</a>
    <a href="https://example.org/book/elsewhere.html">Elsewhere</a>
    <a href="/book/manual.pdf">Manual</a>
    <a href="mailto:team@example.com">Mail</a>
  </main>
</body>
</html>"#;

const ALLOCATORS_PAGE: &str = r#"<html>
<head><title>Allocators | Onyx</title></head>
<body>
  <main>
    <h1>Allocators</h1>
    <p>Use the heap allocator for dynamic memory.</p>
    <h2>Arena</h2>
    <pre><code>arena := alloc.arena.make(context.allocator, 4096);</code></pre>
    <a href="index.html">Back</a>
  </main>
</body>
</html>"#;

const PACKAGES_PAGE: &str = r#"<html>
<head><title>Packages</title></head>
<body><main><h1>Packages</h1><p>Install packages with onyx pkg.</p></main></body>
</html>"#;

/// Mounts the three-page book, each page expected exactly `times` times
async fn mount_book(server: &MockServer, times: u64) {
    for (route, body) in [
        ("/book/index.html", INDEX_PAGE),
        ("/book/allocators.html", ALLOCATORS_PAGE),
        ("/book/packages.html", PACKAGES_PAGE),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(body))
            .expect(times)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());

    mount_book(&mock_server, 1).await;

    let report = crawl(&config, false).await.expect("crawl failed");

    assert_eq!(report.state, CrawlState::Done);
    assert!(report.persisted);
    assert_eq!(report.documents, 3);
    assert_eq!(report.urls_crawled, 3);
    assert_eq!(report.failures, 0);

    // No URL is visited twice
    let visited: HashSet<&str> = report.visited.iter().map(String::as_str).collect();
    assert_eq!(visited.len(), report.visited.len());

    let storage = JsonStorage::open(data_dir.path());
    let documents = storage.load_documents().unwrap();
    assert_eq!(documents.len(), 3);

    // Every stored document was visited
    for document in &documents {
        assert!(
            visited.contains(document.url.as_str()),
            "{} not in visited set",
            document.url
        );
    }

    let allocators = documents
        .iter()
        .find(|d| d.url.ends_with("/book/allocators.html"))
        .expect("allocators page missing");
    assert_eq!(allocators.title, "Allocators");
    assert_eq!(allocators.code_examples.len(), 1);
    assert_eq!(allocators.code_examples[0].context, "Arena");

    assert!(!visited.iter().any(|url| url.contains("/blog/")));
    assert!(!visited.iter().any(|url| url.ends_with(".pdf")));

    let index = storage.load_doc_index().unwrap();
    assert_eq!(index.len(), 3);

    let stats = storage.load_crawl_stats().unwrap().expect("stats missing");
    assert_eq!(stats.total_docs, 3);
    assert_eq!(stats.total_code_examples, 1);
    assert_eq!(stats.final_state, CrawlState::Done.to_string());
}

#[tokio::test]
async fn test_breaker_aborts_and_persists_partial_results() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());

    let links: String = (1..=6)
        .map(|i| format!(r#"<a href="/book/page{}.html">Page {}</a>"#, i, i))
        .collect();
    let seed = format!(
        "<html><body><main><h1>Overview</h1><p>Start here.</p>{}</main></body></html>",
        links
    );

    Mock::given(method("GET"))
        .and(path("/book/index.html"))
        .respond_with(html(&seed))
        .expect(1)
        .mount(&mock_server)
        .await;

    for i in 1..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/book/page{}.html", i)))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    // The breaker trips on the fifth failure; the sixth page is never requested
    Mock::given(method("GET"))
        .and(path("/book/page6.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = crawl(&config, false).await.expect("crawl failed");

    assert_eq!(report.state, CrawlState::Aborted);
    assert_eq!(report.failures, 5);
    assert_eq!(report.documents, 1);
    assert!(report.persisted);

    let storage = JsonStorage::open(data_dir.path());
    let documents = storage.load_documents().unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].url.ends_with("/book/index.html"));

    let stats = storage.load_crawl_stats().unwrap().expect("stats missing");
    assert_eq!(stats.final_state, CrawlState::Aborted.to_string());
    assert_eq!(stats.failures, 5);
}

#[tokio::test]
async fn test_fresh_recrawl_is_a_no_op() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());

    // Each page may be fetched once across both runs
    mount_book(&mock_server, 1).await;

    let first = crawl(&config, false).await.expect("first crawl failed");
    assert!(first.persisted);

    let storage = JsonStorage::open(data_dir.path());
    let snapshot = |storage: &JsonStorage| -> Vec<Vec<u8>> {
        [
            Collection::Documents,
            Collection::DocIndex,
            Collection::CrawlStats,
        ]
        .iter()
        .map(|c| std::fs::read(storage.path_for(*c)).unwrap())
        .collect()
    };
    let before = snapshot(&storage);
    let generation = storage.generation(Collection::Documents).unwrap();

    let mut crawler = DocCrawler::new(&config, JsonStorage::open(data_dir.path())).unwrap();
    let second = crawler.run(false).await.expect("second crawl failed");

    assert!(!second.persisted);
    assert_eq!(second.state, CrawlState::Done);
    assert_eq!(second.urls_crawled, 0);
    assert_eq!(second.skipped_seeds.len(), 1);
    assert_eq!(snapshot(&storage), before);
    assert_eq!(storage.generation(Collection::Documents).unwrap(), generation);
}

#[tokio::test]
async fn test_forced_recrawl_fetches_again() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());

    mount_book(&mock_server, 2).await;

    crawl(&config, false).await.expect("first crawl failed");
    let forced = crawl(&config, true).await.expect("forced crawl failed");

    assert!(forced.persisted);
    assert!(forced.skipped_seeds.is_empty());
    assert_eq!(forced.documents, 3);

    let storage = JsonStorage::open(data_dir.path());
    assert_eq!(storage.generation(Collection::Documents).unwrap(), Some(2));
}

#[tokio::test]
async fn test_non_html_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/book/index.html"))
        .respond_with(html(
            r#"<html><body><main><h1>Overview</h1><p>Data below.</p><a href="data.json">Data</a></main></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&config, false).await.expect("crawl failed");

    assert_eq!(report.state, CrawlState::Done);
    assert_eq!(report.urls_crawled, 2);
    assert_eq!(report.documents, 1);
    assert_eq!(report.failures, 0);
}

fn stored_document(url: String, title: &str) -> Document {
    Document {
        url,
        title: title.to_string(),
        content: format!("{} from an earlier crawl", title),
        headings: Vec::new(),
        code_examples: Vec::new(),
        crawled_at: Utc::now() - Duration::days(1),
    }
}

#[tokio::test]
async fn test_fresh_site_is_carried_while_due_site_is_recrawled() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let data_dir = TempDir::new().unwrap();

    let mut config = create_test_config(&base, &base, data_dir.path());
    config.sites.push(SiteEntry {
        seed: format!("{}/guide/start.html", base),
        allow_prefixes: vec!["/guide/".to_string()],
        exclude_substrings: vec![],
        exclude_suffixes: vec![],
        exclude_paths: vec![],
    });

    let book_seed = format!("{}/book/index.html", base);
    let guide_seed = format!("{}/guide/start.html", base);

    // The book was crawled yesterday; the guide has never been crawled
    let book_crawled_at = Utc::now() - Duration::days(1);
    let mut storage = JsonStorage::new(data_dir.path()).unwrap();
    storage
        .save_documents(&[
            stored_document(book_seed.clone(), "Overview"),
            stored_document(format!("{}/book/allocators.html", base), "Allocators"),
            stored_document(format!("{}/guide/retired.html", base), "Retired"),
        ])
        .unwrap();
    storage
        .save_crawl_stats(&CrawlStats {
            total_docs: 3,
            total_code_examples: 0,
            urls_crawled: 3,
            base_urls: vec![book_seed.clone()],
            crawl_date: book_crawled_at,
            final_state: CrawlState::Done.to_string(),
            failures: 0,
            seed_crawled_at: BTreeMap::from([(book_seed.clone(), book_crawled_at)]),
        })
        .unwrap();

    mount_book(&mock_server, 0).await;

    Mock::given(method("GET"))
        .and(path("/guide/start.html"))
        .respond_with(html(
            r#"<html><body><main><h1>Getting Started</h1><p>Install Onyx.</p><a href="hello.html">Hello</a></main></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guide/hello.html"))
        .respond_with(html(
            r#"<html><body><main><h1>Hello World</h1><p>Your first program.</p></main></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&config, false).await.expect("crawl failed");

    assert!(report.persisted);
    assert_eq!(report.state, CrawlState::Done);
    assert_eq!(report.skipped_seeds, vec![book_seed.clone()]);
    assert_eq!(report.documents, 2);
    assert_eq!(report.documents_persisted, 4);

    let storage = JsonStorage::open(data_dir.path());
    let urls: HashSet<String> = storage
        .load_documents()
        .unwrap()
        .into_iter()
        .map(|d| d.url)
        .collect();
    let expected: HashSet<String> = [
        book_seed.clone(),
        format!("{}/book/allocators.html", base),
        guide_seed.clone(),
        format!("{}/guide/hello.html", base),
    ]
    .into_iter()
    .collect();
    assert_eq!(urls, expected);

    let stats = storage.load_crawl_stats().unwrap().expect("stats missing");
    assert_eq!(stats.total_docs, 4);
    assert_eq!(stats.seed_crawled_at.get(&book_seed), Some(&book_crawled_at));
    assert!(stats.seed_crawled_at[&guide_seed] > book_crawled_at);
}
