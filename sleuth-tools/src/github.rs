//! GitHub repository search.

use async_trait::async_trait;
use serde::Deserialize;
use sleuth_core::collaborators::RepoSearch;
use sleuth_core::config::GithubConfig;
use sleuth_core::error::CollaboratorError;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "GitHub";

/// Text returned when a search matches nothing.
pub const NO_REPOSITORIES_MESSAGE: &str = "No GitHub repositories found.";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
}

/// Searches public repositories, most-starred first.
pub struct GitHubRepoSearch {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    max_results: usize,
}

impl GitHubRepoSearch {
    /// `token` is optional; anonymous requests get a lower rate limit.
    pub fn new(config: &GithubConfig, token: Option<String>) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("sleuth/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            max_results: config.max_results.max(1),
        })
    }
}

fn format_repositories(repos: &[Repository]) -> String {
    if repos.is_empty() {
        return NO_REPOSITORIES_MESSAGE.to_string();
    }
    repos
        .iter()
        .map(|r| {
            let description = r
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or("No description");
            format!(
                "- [{}]({}) ({} stars): {}",
                r.full_name, r.html_url, r.stargazers_count, description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl RepoSearch for GitHubRepoSearch {
    async fn search(&self, query: &str) -> Result<String, CollaboratorError> {
        let url = format!(
            "{}/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            self.base_url,
            urlencoding::encode(query),
            self.max_results
        );
        debug!(url = %url, "Searching repositories");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(CollaboratorError::from_status(SERVICE, status, &text));
        }

        let parsed: SearchResponse =
            serde_json::from_str(&text).map_err(|e| CollaboratorError::ResponseParse {
                service: SERVICE.into(),
                message: e.to_string(),
            })?;
        debug!(count = parsed.items.len(), "Repositories found");

        let repos: Vec<_> = parsed.items.into_iter().take(self.max_results).collect();
        Ok(format_repositories(&repos))
    }
}
