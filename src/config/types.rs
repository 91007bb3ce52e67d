use serde::Deserialize;

/// Main configuration structure for onyx-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
    #[serde(default)]
    pub github: GithubConfig,
}

/// Documentation crawler behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fixed pause between consecutive fetches (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Safety ceiling on pages fetched in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Consecutive fetch failures that abort a run
    #[serde(
        rename = "max-consecutive-failures",
        default = "default_max_consecutive_failures"
    )]
    pub max_consecutive_failures: u32,

    /// Seeds crawled more recently than this are skipped unless forced
    #[serde(rename = "freshness-days", default = "default_freshness_days")]
    pub freshness_days: i64,
}

/// User agent identification
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the JSON corpora
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

/// A documentation site to crawl, with its link scope
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Seed URL; its host becomes the allowed host
    pub seed: String,

    /// Path prefixes links must start with
    #[serde(rename = "allow-prefixes")]
    pub allow_prefixes: Vec<String>,

    #[serde(rename = "exclude-substrings", default)]
    pub exclude_substrings: Vec<String>,

    #[serde(rename = "exclude-suffixes", default = "default_exclude_suffixes")]
    pub exclude_suffixes: Vec<String>,

    #[serde(rename = "exclude-paths", default)]
    pub exclude_paths: Vec<String>,
}

/// Repository harvester configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// Base for human-facing file links
    #[serde(rename = "web-base", default = "default_web_base")]
    pub web_base: String,

    /// Environment variable holding an API token, if any
    #[serde(rename = "token-env", default)]
    pub token_env: Option<String>,

    /// Files larger than this (bytes) are skipped
    #[serde(rename = "max-file-size", default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(rename = "max-files-per-repo", default = "default_max_files_per_repo")]
    pub max_files_per_repo: usize,

    #[serde(rename = "blob-delay-ms", default = "default_blob_delay_ms")]
    pub blob_delay_ms: u64,

    #[serde(rename = "repo-delay-ms", default = "default_repo_delay_ms")]
    pub repo_delay_ms: u64,

    #[serde(default)]
    pub repositories: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
            max_consecutive_failures: default_max_consecutive_failures(),
            freshness_days: default_freshness_days(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            web_base: default_web_base(),
            token_env: None,
            max_file_size: default_max_file_size(),
            max_files_per_repo: default_max_files_per_repo(),
            blob_delay_ms: default_blob_delay_ms(),
            repo_delay_ms: default_repo_delay_ms(),
            repositories: Vec::new(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> usize {
    500
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_freshness_days() -> i64 {
    7
}

fn default_exclude_suffixes() -> Vec<String> {
    [".pdf", ".zip", ".tar.gz", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".wasm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_web_base() -> String {
    "https://github.com".to_string()
}

fn default_max_file_size() -> u64 {
    100_000
}

fn default_max_files_per_repo() -> usize {
    200
}

fn default_blob_delay_ms() -> u64 {
    100
}

fn default_repo_delay_ms() -> u64 {
    1000
}
