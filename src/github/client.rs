//! Hosting API client
//!
//! Thin wrapper over the three REST calls the walker needs: repository
//! metadata, the recursive tree of one ref, and individual blobs.

use crate::config::{GithubConfig, UserAgentConfig};
use crate::github::reference::RepositoryRef;
use crate::github::GithubError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Repository metadata as returned by `GET /repos/{owner}/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryMetadata {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// `blob`, `tree` or `commit`
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// Client for the repository host's REST API
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    /// Builds a client
    ///
    /// The bearer token, if any, is read from the environment variable named
    /// by `token-env`. A missing or empty variable means anonymous access.
    ///
    /// # Arguments
    ///
    /// * `config` - The `[github]` section
    /// * `user_agent` - Identification sent with every request
    /// * `timeout_secs` - Per-request timeout
    pub fn new(
        config: &GithubConfig,
        user_agent: &UserAgentConfig,
        timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .build()?;

        let token = config
            .token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|token| !token.trim().is_empty());

        if token.is_some() {
            tracing::debug!("Using API token from environment");
        }

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Looks up repository metadata
    pub async fn repository(
        &self,
        repository: &RepositoryRef,
    ) -> Result<RepositoryMetadata, GithubError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_base, repository.owner, repository.name
        );
        self.get_json(&url).await
    }

    /// Lists every entry of `reference` in one recursive call
    pub async fn tree(
        &self,
        repository: &RepositoryRef,
        reference: &str,
    ) -> Result<Vec<TreeEntry>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base, repository.owner, repository.name, reference
        );
        let response: TreeResponse = self.get_json(&url).await?;

        if response.truncated {
            tracing::warn!(
                "Tree listing for {} was truncated by the API",
                repository
            );
        }

        Ok(response.tree)
    }

    /// Fetches and decodes one blob
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Blob content, decoded as lossy UTF-8
    /// * `Err(GithubError)` - Request failed or the content could not be decoded
    pub async fn blob(
        &self,
        repository: &RepositoryRef,
        sha: &str,
        path: &str,
    ) -> Result<String, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/git/blobs/{}",
            self.api_base, repository.owner, repository.name, sha
        );
        let response: BlobResponse = self.get_json(&url).await?;
        decode_blob(&response.content, &response.encoding, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| GithubError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| GithubError::Request {
            url: url.to_string(),
            source,
        })
    }
}

/// Decodes blob content returned by the API
///
/// Base64 payloads arrive wrapped at 60 columns; line breaks are removed
/// before decoding.
pub fn decode_blob(content: &str, encoding: &str, path: &str) -> Result<String, GithubError> {
    match encoding {
        "base64" => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| GithubError::Decode {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        "utf-8" | "utf8" => Ok(content.to_string()),
        other => Err(GithubError::Decode {
            path: path.to_string(),
            message: format!("unsupported encoding '{}'", other),
        }),
    }
}
