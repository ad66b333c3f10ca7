//! HTTP implementation of [`SearchBackend`] over the backend's JSON API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | search    | `POST /search {query, num_results}` |
//! | export    | `POST /export {results, format}` → file body |
//! | favorite  | `POST /favorites {favorite}` |
//! | click     | `POST /click {url}` |
//! | analytics | `GET /analytics` |
//! | favorites | `GET /favorites` |

use crate::backend::SearchBackend;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::build_client;
use crate::types::{
    Ack, AnalyticsResponse, ClickRequest, ExportFormat, ExportRequest, ExportSections,
    FavoriteRequest, FavoritesResponse, ResultItem, SearchRequest, SearchResponse,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Backend client speaking the JSON API over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    config: ClientConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.config.base_url)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish()
    }
}

impl HttpBackend {
    /// Create a backend client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and fail on non-success statuses.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(response)
    }

    /// Read the full body and decode it as JSON.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let body = response.bytes().await.map_err(ClientError::from_reqwest)?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Decode an acknowledgment. An empty body also counts as acknowledged.
    async fn acknowledge(response: reqwest::Response) -> Result<(), ClientError> {
        let body = response.bytes().await.map_err(ClientError::from_reqwest)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let ack: Ack =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        tracing::trace!(status = %ack.status, "backend acknowledged");
        Ok(())
    }
}

impl SearchBackend for HttpBackend {
    async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        tracing::trace!(query, "POST /search");
        let body = SearchRequest {
            query: query.to_string(),
            num_results: self.config.num_results,
        };
        let request = self.client.post(self.config.endpoint("search")).json(&body);
        let response = self.send(request).await?;
        let decoded: SearchResponse = Self::decode(response).await?;
        tracing::debug!(
            sections = decoded.results.len(),
            trending = decoded.trending.len(),
            "search response decoded"
        );
        Ok(decoded)
    }

    async fn export(
        &self,
        results: &ExportSections,
        format: ExportFormat,
    ) -> Result<Bytes, ClientError> {
        let body = ExportRequest {
            results: results.clone(),
            format,
        };
        let request = self.client.post(self.config.endpoint("export")).json(&body);
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        tracing::debug!(%format, size = bytes.len(), "export body received");
        Ok(bytes)
    }

    async fn favorite(&self, item: &ResultItem) -> Result<(), ClientError> {
        let body = FavoriteRequest {
            favorite: item.clone(),
        };
        let request = self.client.post(self.config.endpoint("favorites")).json(&body);
        let response = self.send(request).await?;
        Self::acknowledge(response).await
    }

    async fn record_click(&self, url: &str) -> Result<(), ClientError> {
        let body = ClickRequest {
            url: url.to_string(),
        };
        let request = self.client.post(self.config.endpoint("click")).json(&body);
        let response = self.send(request).await?;
        Self::acknowledge(response).await
    }

    async fn analytics(&self) -> Result<AnalyticsResponse, ClientError> {
        let request = self.client.get(self.config.endpoint("analytics"));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn favorites(&self) -> Result<Vec<ResultItem>, ClientError> {
        let request = self.client.get(self.config.endpoint("favorites"));
        let response = self.send(request).await?;
        let decoded: FavoritesResponse = Self::decode(response).await?;
        Ok(decoded.favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        let err = HttpBackend::new(ClientConfig::with_base_url("nope")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(!err.is_transport_failure());
    }

    #[test]
    fn config_reports_the_backend_in_use() {
        let backend = HttpBackend::new(ClientConfig::with_base_url("http://search.local:8080/api"))
            .expect("valid config");
        assert_eq!(backend.config().base_url, "http://search.local:8080/api");
        assert_eq!(backend.config().num_results, ClientConfig::default().num_results);
    }

    #[test]
    fn debug_shows_base_url_only() {
        let backend = HttpBackend::new(ClientConfig::default()).expect("valid config");
        let debug = format!("{backend:?}");
        assert!(debug.contains("127.0.0.1:5000"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_failure() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9/api".into(),
            timeout_seconds: 2,
            ..Default::default()
        };
        let backend = HttpBackend::new(config).expect("valid config");
        let err = backend.search("rust").await.unwrap_err();
        assert!(err.is_transport_failure());
    }
}
