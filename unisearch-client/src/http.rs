//! Shared HTTP client construction for backend requests.

use crate::config::ClientConfig;
use crate::error::ClientError;
use std::time::Duration;

/// Build a [`reqwest::Client`] configured for the search backend.
///
/// The client has:
/// - Timeout from config
/// - User-Agent from config (or the crate default)
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the client cannot be constructed.
pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))
}
