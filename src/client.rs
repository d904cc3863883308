use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::models::{FailureKind, Profile};

/// Everything that can go wrong between a search term and a [`Profile`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot build a user URL from `{0}`")]
    InvalidUrl(String),
    #[error("GitHub API error ({0})")]
    Status(u16),
    #[error("failed to deserialize GitHub user response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to send request to GitHub API: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status(404) => FailureKind::NotFound,
            FetchError::Status(code) => FailureKind::Status(*code),
            FetchError::Decode(_) => FailureKind::Decode,
            FetchError::InvalidUrl(_) | FetchError::Transport(_) => FailureKind::Transport,
        }
    }
}

/// GitHub REST client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    api_base: Url,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = build_client(config.token.as_deref())?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// `{api_base}/users/{username}` with the username percent-encoded as one segment.
    ///
    /// `.` and `..` are rejected: URL normalisation would turn them into `/users`.
    pub fn user_url(&self, username: &str) -> Result<Url, FetchError> {
        if matches!(username, "." | "..") {
            return Err(FetchError::InvalidUrl(username.to_owned()));
        }
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(username.to_owned()))?
            .pop_if_empty()
            .push("users")
            .push(username);
        url.set_query(None);
        Ok(url)
    }

    /// Fetches a GitHub user by username.
    ///
    /// Only a 2xx response whose body decodes into a [`Profile`] succeeds.
    pub async fn fetch_profile(&self, username: &str) -> Result<Profile, FetchError> {
        let url = self.user_url(username)?;
        tracing::debug!(%url, "requesting profile");

        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Creates a preconfigured HTTP client with required headers.
fn build_client(token: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("github-profile-search"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

    if let Some(token) = token {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid token value")?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}
