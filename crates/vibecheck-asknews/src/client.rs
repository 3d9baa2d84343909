//! HTTP client for the `AskNews` REST API.
//!
//! Wraps `reqwest` with bearer-token auth, status classification, and typed
//! response deserialization.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::AskNewsError;
use crate::types::{NewsArticle, NewsSearchResponse, StoriesResponse, StoryCluster};

const DEFAULT_BASE_URL: &str = "https://api.asknews.app/";

/// Client for the `AskNews` REST API.
///
/// Use [`AskNewsClient::new`] for production or
/// [`AskNewsClient::with_base_url`] to point at a mock server in tests.
pub struct AskNewsClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl AskNewsClient {
    /// Creates a new client pointed at the production `AskNews` API.
    ///
    /// # Errors
    ///
    /// Returns [`AskNewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AskNewsError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AskNewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AskNewsError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AskNewsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vibecheck/0.1 (sentiment-ingest)")
            .build()?;

        // Exactly one trailing slash so Url::join appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| AskNewsError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Searches recent news articles mentioning `entity_name`.
    ///
    /// # Errors
    ///
    /// - [`AskNewsError::Unauthorized`] on 401/403.
    /// - [`AskNewsError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`AskNewsError::Http`] on network failure or timeout.
    /// - [`AskNewsError::Deserialize`] if the body does not match the expected shape.
    pub async fn fetch_news(
        &self,
        entity_name: &str,
        limit: u32,
    ) -> Result<Vec<NewsArticle>, AskNewsError> {
        let limit = limit.to_string();
        let url = self.build_url(
            "v1/news/search",
            &[
                ("query", entity_name),
                ("n_articles", &limit),
                ("return_type", "dicts"),
                ("string_guarantee", entity_name),
            ],
        )?;

        let body = self.request_json(&url).await?;
        let envelope: NewsSearchResponse =
            serde_json::from_value(body).map_err(|e| AskNewsError::Deserialize {
                context: format!("news search (query={entity_name})"),
                source: e,
            })?;

        let articles = envelope.as_dicts.unwrap_or_default();
        tracing::debug!(
            entity = entity_name,
            count = articles.len(),
            "asknews: news fetched"
        );
        Ok(articles)
    }

    /// Fetches story clusters mentioning `entity_name`.
    ///
    /// # Errors
    ///
    /// Same classification as [`AskNewsClient::fetch_news`].
    pub async fn fetch_stories(
        &self,
        entity_name: &str,
        limit: u32,
    ) -> Result<Vec<StoryCluster>, AskNewsError> {
        let limit = limit.to_string();
        let url = self.build_url("v1/stories", &[("query", entity_name), ("limit", &limit)])?;

        let body = self.request_json(&url).await?;
        let envelope: StoriesResponse =
            serde_json::from_value(body).map_err(|e| AskNewsError::Deserialize {
                context: format!("stories (query={entity_name})"),
                source: e,
            })?;

        tracing::debug!(
            entity = entity_name,
            count = envelope.stories.len(),
            "asknews: stories fetched"
        );
        Ok(envelope.stories)
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, AskNewsError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| AskNewsError::InvalidBaseUrl(format!("joining '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, AskNewsError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AskNewsError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(AskNewsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.path().to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AskNewsError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}
