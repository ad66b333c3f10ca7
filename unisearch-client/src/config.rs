//! Backend client configuration with sensible defaults.
//!
//! [`ClientConfig`] controls where the backend lives, how long requests may
//! take and how many results each upstream source is asked for.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Upper bound for `num_results`; the upstream APIs cap pages well below this.
const MAX_RESULTS_PER_SOURCE: usize = 50;

/// Configuration for the backend client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend API, e.g. `http://127.0.0.1:5000/api`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Results requested from each upstream source per search.
    pub num_results: usize,
    /// Custom User-Agent. If `None`, `unisearch/<version>` is sent.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".into(),
            timeout_seconds: 10,
            num_results: 5,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at `base_url` with default settings.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` parses as an `http` or `https` URL
    /// - `timeout_seconds` must be greater than 0
    /// - `num_results` must be between 1 and 50
    pub fn validate(&self) -> Result<(), ClientError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("base_url is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(ClientError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.num_results == 0 || self.num_results > MAX_RESULTS_PER_SOURCE {
            return Err(ClientError::Config(format!(
                "num_results must be between 1 and {MAX_RESULTS_PER_SOURCE}"
            )));
        }
        Ok(())
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// User-Agent header value for requests.
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("unisearch/{}", env!("CARGO_PKG_VERSION")))
    }
}
