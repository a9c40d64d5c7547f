use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SearchConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const NO_README: &str = "No README available.";
pub const NO_DESCRIPTION: &str = "No description provided.";

const USER_AGENT: &str = concat!("contribguide/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("both a technology stack and interest areas are required")]
    EmptyQuery,
}

/// A recommended repository, fetched fresh per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub description: String,
    pub url: String,
    pub readme: String,
    pub stars: u64,
    pub forks: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Vec<RepoItem>,
}

#[derive(Deserialize)]
struct RepoItem {
    full_name: String,
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
}

/// GitHub repository search.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    max_results: usize,
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
            max_results: 5,
        }
    }

    /// The token is optional; without one GitHub applies anonymous rate limits.
    pub fn from_config(config: &SearchConfig) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::debug!(env = %config.token_env, "no GitHub token set, using anonymous access");
        }
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
            token,
            max_results: config.max_results,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// `language:<lang>` per comma-separated stack entry, then the interest
    /// terms, matched against repository descriptions.
    pub fn build_query(tech_stack: &str, interests: &str) -> Result<String, SearchError> {
        let languages: Vec<String> = tech_stack
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| format!("language:{l}"))
            .collect();
        let interests = interests.trim();
        if languages.is_empty() || interests.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(format!("{} {interests} in:description", languages.join(" ")))
    }

    /// Top repositories by stars for the query, READMEs included.
    pub async fn recommend(
        &self,
        tech_stack: &str,
        interests: &str,
    ) -> Result<Vec<ProjectRecord>, SearchError> {
        let query = Self::build_query(tech_stack, interests)?;
        tracing::info!(query = %query, "searching repositories");

        let per_page = self.max_results.clamp(1, 100).to_string();
        let response = self
            .request(&format!("{}/search/repositories", self.base()))
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;
        let parsed: SearchResponse = response.json().await?;

        let mut projects = Vec::with_capacity(self.max_results);
        for item in parsed.items.into_iter().take(self.max_results) {
            let readme = match self.fetch_readme(&item.full_name).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(repo = %item.full_name, error = %e, "README unavailable");
                    NO_README.to_string()
                }
            };
            projects.push(ProjectRecord {
                name: item.full_name,
                description: item
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                url: item.html_url,
                readme,
                stars: item.stargazers_count,
                forks: item.forks_count,
            });
        }
        tracing::info!(count = projects.len(), "recommended repositories");
        Ok(projects)
    }

    /// Raw README text for `owner/name`.
    pub async fn fetch_readme(&self, full_name: &str) -> Result<String, SearchError> {
        let response = self
            .request(&format!("{}/repos/{full_name}/readme", self.base()))
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.get(url).header("User-Agent", USER_AGENT);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Api {
        status: status.as_u16(),
        body,
    })
}
