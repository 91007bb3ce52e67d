//! Integration tests for the repository walker

use crate::common::create_test_config;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use onyx_harvest::github::harvest;
use onyx_harvest::storage::{JsonStorage, Storage};
use onyx_harvest::types::{ComplexityTier, FileType};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "/repos/onyx-lang/pkg-http-server";

const HTTP_DEMO: &str = r#"use core.net

Server :: struct { port: u32; }

main :: () {
    server := Server.{ port = 8080 };
    println("listening");
}
"#;

const README: &str = "# pkg-http-server\n\nAn HTTP server for Onyx.\n";

/// Mounts a blob endpoint; the payload is base64 wrapped the way the API wraps it
async fn mount_blob(server: &MockServer, sha: &str, content: &str) {
    let encoded = STANDARD.encode(content);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("{}/git/blobs/{}", REPO, sha)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": sha,
            "content": wrapped.join("\n"),
            "encoding": "base64",
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_repository(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(REPO))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "onyx-lang/pkg-http-server",
            "description": "HTTP server package",
            "stargazers_count": 42,
            "html_url": "https://github.com/onyx-lang/pkg-http-server",
            "language": "Onyx",
            "default_branch": "main",
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/git/trees/main", REPO)))
        .and(query_param("recursive", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "tree-sha",
            "truncated": false,
            "tree": [
                { "path": "README.md", "type": "blob", "sha": "readme-sha", "size": README.len() },
                { "path": "examples", "type": "tree", "sha": "examples-sha" },
                { "path": "examples/http_demo.onyx", "type": "blob", "sha": "demo-sha", "size": HTTP_DEMO.len() },
                { "path": "lib/huge.onyx", "type": "blob", "sha": "huge-sha", "size": 5_000_000 },
                { "path": "node_modules/pkg/index.js", "type": "blob", "sha": "vendored-sha", "size": 10 },
                { "path": "logo.png", "type": "blob", "sha": "logo-sha", "size": 10 },
            ],
        })))
        .mount(server)
        .await;

    mount_blob(server, "readme-sha", README).await;
    mount_blob(server, "demo-sha", HTTP_DEMO).await;

    // Oversize, vendored and unclassified files are never fetched
    for sha in ["huge-sha", "vendored-sha", "logo-sha"] {
        Mock::given(method("GET"))
            .and(path(format!("{}/git/blobs/{}", REPO, sha)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_harvest_builds_repository_corpus() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());
    config.github.repositories = vec!["https://github.com/onyx-lang/pkg-http-server".to_string()];

    mount_repository(&mock_server).await;

    let report = harvest(&config).await.expect("harvest failed");

    assert_eq!(report.repositories, 1);
    assert_eq!(report.degraded, 0);
    assert_eq!(report.files, 2);
    assert_eq!(report.skipped_oversize, 1);
    assert_eq!(report.dropped_files, 0);

    let storage = JsonStorage::open(data_dir.path());

    let repositories = storage.load_repositories().unwrap();
    assert_eq!(repositories[0].full_name, "onyx-lang/pkg-http-server");
    assert_eq!(repositories[0].stars, 42);
    assert_eq!(repositories[0].default_branch.as_deref(), Some("main"));

    let files = storage.load_repository_files().unwrap();
    let readme = files.iter().find(|f| f.path == "README.md").unwrap();
    assert_eq!(readme.file_type, FileType::Readme);
    assert_eq!(readme.content, README);

    let demo = files
        .iter()
        .find(|f| f.path == "examples/http_demo.onyx")
        .unwrap();
    assert_eq!(demo.file_type, FileType::Source);
    assert_eq!(demo.content, HTTP_DEMO);
    assert_eq!(
        demo.url,
        "https://github.com/onyx-lang/pkg-http-server/blob/main/examples/http_demo.onyx"
    );

    let patterns = storage.load_patterns().unwrap();
    assert_eq!(patterns.imports.len(), 1);
    assert_eq!(patterns.structs.len(), 1);
    assert!(patterns
        .functions
        .iter()
        .any(|record| record.definition.starts_with("main ::")));

    let topics = storage.load_topics().unwrap();
    let http = topics.get("http").expect("http topic missing");
    assert_eq!(http[0].path, "examples/http_demo.onyx");
    assert_eq!(http[0].complexity, Some(ComplexityTier::Simple));

    let analysis = storage.load_file_analysis().unwrap();
    assert_eq!(analysis.len(), 1);

    let file_types = storage.load_file_types().unwrap();
    assert_eq!(file_types.get(&FileType::Readme), Some(&1));
    assert_eq!(file_types.get(&FileType::Source), Some(&1));
}

#[tokio::test]
async fn test_missing_metadata_gives_degraded_descriptor() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());
    config.github.repositories = vec![
        "onyx-lang/vanished".to_string(),
        "not a repository".to_string(),
    ];

    Mock::given(method("GET"))
        .and(path("/repos/onyx-lang/vanished"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Without metadata the walker falls back to HEAD
    Mock::given(method("GET"))
        .and(path("/repos/onyx-lang/vanished/git/trees/HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = harvest(&config).await.expect("harvest failed");

    assert_eq!(report.repositories, 1);
    assert_eq!(report.degraded, 1);
    assert_eq!(report.files, 0);
    assert_eq!(report.invalid_references, vec!["not a repository".to_string()]);

    let storage = JsonStorage::open(data_dir.path());
    let repositories = storage.load_repositories().unwrap();
    assert_eq!(repositories[0].full_name, "onyx-lang/vanished");
    assert!(repositories[0].fetch_error.is_some());

    // An empty corpus is still a written corpus
    assert!(storage.load_repository_files().unwrap().is_empty());
    assert!(storage.load_topics().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_and_oversize_blobs_do_not_stop_the_walk() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &mock_server.uri(), data_dir.path());
    config.github.repositories = vec!["onyx-lang/pkg-http-server".to_string()];
    config.github.max_file_size = 100;

    // Listed as small, but decodes well past the cap
    let padded = format!("// {}\nmain :: () {{}}\n", "x".repeat(200));

    Mock::given(method("GET"))
        .and(path(REPO))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "onyx-lang/pkg-http-server",
            "html_url": "https://github.com/onyx-lang/pkg-http-server",
            "default_branch": "main",
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/git/trees/main", REPO)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "truncated": false,
            "tree": [
                { "path": "examples/http_demo.onyx", "type": "blob", "sha": "demo-sha", "size": 40 },
                { "path": "src/padded.onyx", "type": "blob", "sha": "padded-sha", "size": 10 },
                { "path": "README.md", "type": "blob", "sha": "readme-sha", "size": README.len() },
            ],
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/git/blobs/demo-sha", REPO)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_blob(&mock_server, "padded-sha", &padded).await;
    mount_blob(&mock_server, "readme-sha", README).await;

    let report = harvest(&config).await.expect("harvest failed");

    assert_eq!(report.repositories, 1);
    assert_eq!(report.degraded, 0);
    assert_eq!(report.dropped_files, 1);
    assert_eq!(report.skipped_oversize, 1);
    assert_eq!(report.files, 1);

    let storage = JsonStorage::open(data_dir.path());
    let files = storage.load_repository_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "README.md");
    assert_eq!(files[0].content, README);
}
