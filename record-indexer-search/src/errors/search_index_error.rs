//! Search index error types.
//!
//! This module defines the error types that can occur while talking to the search engine.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Configured engine major version is not supported.
    #[error("Unsupported search engine version: {0}")]
    UnsupportedVersion(u32),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request failed on the wire.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine answered with something that could not be interpreted.
    #[error("Unexpected response: {0}")]
    Response(String),
}

impl SearchIndexError {
    /// Create an unsupported version error.
    pub fn unsupported_version(major: u32) -> Self {
        Self::UnsupportedVersion(major)
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a response error.
    pub fn response(msg: impl Into<String>) -> Self {
        Self::Response(msg.into())
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Transport(_))
    }
}
