//! Error types for the search console.

use unisearch_client::ClientError;

/// Top-level error type for the search console.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// A backend request failed or was rejected.
    #[error("backend error: {0}")]
    Backend(#[from] ClientError),

    /// Copying to the system clipboard is unsupported or was denied.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// The link could not be handed to a browser.
    #[error("browser error: {0}")]
    Browser(String),

    /// A user command was rejected before reaching the backend.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// Whether this error means a backend request could not complete.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Backend(err) if err.is_transport_failure())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ConsoleError>;
