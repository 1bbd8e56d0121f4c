//! Configuration types for the IndexClient.

use std::fmt;
use std::time::Duration;

use crate::errors::SearchIndexError;

/// Default number of documents sent in a single bulk request.
pub const DEFAULT_DOCS_PER_BULK_REQUEST: usize = 5000;

/// Upper bound for the backoff between two retries.
pub const MAX_RETRY_WAIT: Duration = Duration::from_millis(5000);

/// Major protocol version of the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineVersion {
    V7,
    V8,
}

impl EngineVersion {
    /// Map a configured major version onto a supported protocol.
    pub fn from_major(major: u32) -> Result<Self, SearchIndexError> {
        match major {
            7 => Ok(EngineVersion::V7),
            8 => Ok(EngineVersion::V8),
            other => Err(SearchIndexError::unsupported_version(other)),
        }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineVersion::V7 => write!(f, "7"),
            EngineVersion::V8 => write!(f, "8"),
        }
    }
}

/// Basic authentication credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection and behaviour settings for the search engine.
#[derive(Debug, Clone)]
pub struct SearchEngineConfig {
    /// Node URLs. Only the first one is used.
    pub nodes: Vec<String>,
    pub version: EngineVersion,
    pub basic_auth: Option<BasicAuth>,
    /// Per-request timeout. `None` keeps the client default.
    pub connection_timeout: Option<Duration>,
    /// Extra attempts after a connection or transport failure.
    pub max_retries: u32,
    /// Wait before the first retry; doubled on each following retry.
    pub retry_wait: Duration,
    /// Maximum documents per bulk request. Set to None to send each batch in one request.
    pub docs_per_bulk_request: Option<usize>,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            version: EngineVersion::V7,
            basic_auth: None,
            connection_timeout: None,
            max_retries: 3,
            retry_wait: Duration::from_millis(100),
            docs_per_bulk_request: Some(DEFAULT_DOCS_PER_BULK_REQUEST),
        }
    }
}

impl SearchEngineConfig {
    /// Create a config for a single node with default settings.
    pub fn new(node: impl Into<String>, version: EngineVersion) -> Self {
        Self {
            nodes: vec![node.into()],
            version,
            ..Self::default()
        }
    }

    /// The node the providers connect to.
    pub fn primary_node(&self) -> Result<&str, SearchIndexError> {
        self.nodes
            .iter()
            .map(|node| node.trim())
            .find(|node| !node.is_empty())
            .ok_or_else(|| SearchIndexError::configuration("no search engine node configured"))
    }

    /// Backoff before retry number `attempt` (starting at 1).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_wait.saturating_mul(factor).min(MAX_RETRY_WAIT)
    }
}
