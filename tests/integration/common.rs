//! Shared fixtures for the integration tests

use onyx_harvest::config::{
    Config, CrawlerConfig, GithubConfig, OutputConfig, SiteEntry, UserAgentConfig,
};
use std::path::Path;
use wiremock::ResponseTemplate;

/// Creates a test configuration with one documentation site under `/book/`
pub fn create_test_config(docs_base: &str, api_base: &str, data_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            delay_ms: 0,
            timeout_secs: 5,
            max_pages: 50,
            max_consecutive_failures: 5,
            freshness_days: 7,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            data_dir: data_dir.to_string_lossy().into_owned(),
        },
        sites: vec![SiteEntry {
            seed: format!("{}/book/index.html", docs_base),
            allow_prefixes: vec!["/book/".to_string()],
            exclude_substrings: vec![],
            exclude_suffixes: vec![".pdf".to_string()],
            exclude_paths: vec![],
        }],
        github: GithubConfig {
            api_base: api_base.to_string(),
            blob_delay_ms: 0,
            repo_delay_ms: 0,
            ..GithubConfig::default()
        },
    }
}

/// An HTML page response
pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}
