//! Error types for repository access.

use thiserror::Error;

/// Errors raised while fetching from an upstream repository.
///
/// Non-success statuses and unexpected bodies are not errors; they end the
/// current sequence (or yield an empty record) instead.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Configured base URL or a derived endpoint is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request failed on the wire.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RepositoryError {
    /// Create an invalid URL error.
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
