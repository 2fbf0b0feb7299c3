//! Client for the Windwalker data service.
//!
//! [`DataService`] is the seam the controllers depend on; [`HttpDataService`]
//! is the production implementation over `reqwest`. The service is read-only
//! JSON:
//! - `GET /api/v1/treaties[?year_end=YYYY]`
//! - `GET /api/v1/treaties/{id}`
//! - `GET /api/v1/search?q=...`
//! - `GET /api/v1/boundaries`
//! - `GET /health`

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{FeatureCollection, Health, SearchResponse, Treaty, TreatyList};

const API_PREFIX: &str = "/api/v1";

/// Requests the core needs from the data service.
///
/// Implementations hold no state beyond in-flight bookkeeping; responses
/// are returned as-is and ordering is the caller's concern.
pub trait DataService: Send + Sync + 'static {
    /// List treaties, optionally only those signed in or before `year_end`.
    fn list_treaties(
        &self,
        year_end: Option<i32>,
    ) -> impl Future<Output = Result<TreatyList, ClientError>> + Send;

    /// Fetch one full treaty record.
    fn get_treaty(&self, id: &str) -> impl Future<Output = Result<Treaty, ClientError>> + Send;

    fn search(&self, query: &str) -> impl Future<Output = Result<SearchResponse, ClientError>> + Send;

    /// Fetch the full boundary geometry.
    fn boundaries(&self) -> impl Future<Output = Result<FeatureCollection, ClientError>> + Send;

    fn health(&self) -> impl Future<Output = Result<Health, ClientError>> + Send;
}

/// HTTP implementation of [`DataService`].
#[derive(Debug, Clone)]
pub struct HttpDataService {
    base_url: String,
    client: Client,
}

impl HttpDataService {
    /// Create a client for the service rooted at `base_url` (no `/api/v1` suffix).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { base_url, client }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_timeout(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

impl DataService for HttpDataService {
    async fn list_treaties(&self, year_end: Option<i32>) -> Result<TreatyList, ClientError> {
        let mut req = self.get(&format!("{}/treaties", API_PREFIX));
        if let Some(year) = year_end {
            req = req.query(&[("year_end", year)]);
        }
        tracing::debug!(?year_end, "GET treaties");
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn get_treaty(&self, id: &str) -> Result<Treaty, ClientError> {
        tracing::debug!(id, "GET treaty");
        let response = self
            .get(&format!("{}/treaties/{}", API_PREFIX, id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        tracing::debug!(query, "GET search");
        let response = self
            .get(&format!("{}/search", API_PREFIX))
            .query(&[("q", query)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn boundaries(&self) -> Result<FeatureCollection, ClientError> {
        let response = self
            .get(&format!("{}/boundaries", API_PREFIX))
            .send()
            .await?;
        // The service answers upstream failures with `{ "error": "..." }`
        let body: serde_json::Value = self.handle_response(response).await?;
        if let Some(error) = body.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ClientError::Malformed(message));
        }
        serde_json::from_value(body).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    async fn health(&self) -> Result<Health, ClientError> {
        let response = self.get("/health").send().await?;
        self.handle_response(response).await
    }
}
