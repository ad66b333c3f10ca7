//! Error types for the unisearch-client crate.
//!
//! Messages are stable and safe to show to users. Request bodies and
//! queries never appear in error text.

/// Errors that can occur while talking to the search backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the connection dropped.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend did not answer within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether this error means the request could not complete.
    ///
    /// Configuration problems are detected before any request is made and
    /// are therefore not transport failures.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Convenience type alias for unisearch-client results.
pub type Result<T> = std::result::Result<T, ClientError>;
