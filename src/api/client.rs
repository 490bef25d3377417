//! HTTP client for the eCFR REST API.
//!
//! Requests are issued one at a time; callers decide how a failure degrades.

use crate::api::types::{AgenciesResponse, TitlesResponse, VersionsResponse};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure to obtain a resource from the eCFR API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ecfr.gov".to_string(),
            timeout_seconds: 120,
            user_agent: concat!("ecfr-wordcount/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&crate::config::ApiConfig> for ClientConfig {
    fn from(config: &crate::config::ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Client for the agency, title, version and full-text endpoints.
pub struct EcfrClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EcfrClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Agency metadata with CFR references.
    pub async fn fetch_agencies(&self) -> Result<AgenciesResponse, FetchError> {
        self.get_json("/api/admin/v1/agencies.json").await
    }

    /// All titles with their latest issue dates.
    pub async fn fetch_titles(&self) -> Result<TitlesResponse, FetchError> {
        self.get_json("/api/versioner/v1/titles.json").await
    }

    /// Content versions published for one title.
    pub async fn fetch_versions(&self, title: &str) -> Result<VersionsResponse, FetchError> {
        self.get_json(&format!("/api/versioner/v1/versions/title-{}.json", title))
            .await
    }

    /// Raw XML of a whole title as of an issue date.
    pub async fn fetch_title_document(
        &self,
        title: &str,
        issue_date: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let path = format!("/api/versioner/v1/full/{}/title-{}.xml", issue_date, title);
        let (url, response) = self.get(&path).await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { url, source })?;

        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let (url, response) = self.get(path).await?;

        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Decode { url, source })
    }

    async fn get(&self, path: &str) -> Result<(String, reqwest::Response), FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        Ok((url, response))
    }
}
