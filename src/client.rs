use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::{self, ApiConfig};
use crate::models::{GitHubUser, Repository};

/// Any failure while reading from a remote JSON endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API error ({status}) for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to deserialize response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read access to the two GitHub resources the explorer merges into one view.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn fetch_user(&self, username: &str) -> Result<GitHubUser, FetchError>;

    async fn fetch_repos(&self, username: &str) -> Result<Vec<Repository>, FetchError>;
}

/// Creates a preconfigured HTTP client with required headers.
fn build_client(config: &ApiConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).context("Invalid user agent value")?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static(config::ACCEPT));

    if let Some(token) = config.token.as_deref() {
        let mut val =
            HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid token value")?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
    }

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// GitHub REST client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: ApiConfig,
}

impl GitHubClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = build_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// GETs `url` and decodes the JSON body, treating any non-2xx status as an error.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ProfileService for GitHubClient {
    /// Fetches a GitHub user by username.
    async fn fetch_user(&self, username: &str) -> Result<GitHubUser, FetchError> {
        self.get_json(&self.config.user_url(username)).await
    }

    /// Fetches the first page of a user's public repositories, in API order.
    async fn fetch_repos(&self, username: &str) -> Result<Vec<Repository>, FetchError> {
        self.get_json(&self.config.repos_url(username)).await
    }
}
