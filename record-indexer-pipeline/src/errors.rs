//! Error types for the indexing pipeline.

use thiserror::Error;

use record_indexer_repository::RepositoryError;

/// Errors surfaced by pipeline operations.
///
/// Write-level failures never show up here; they are reported inside
/// `IndexResult`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller input was empty or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No repository is configured under this code.
    #[error("Invalid repository code '{0}'")]
    InvalidRepositoryCode(String),

    /// The record does not exist under the given organization.
    #[error("Record '{id}' not found in organization '{organization}'")]
    RecordNotFound { organization: String, id: String },

    /// Fetching from the upstream repository failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Kafka error: {0}")]
    Kafka(String),

    /// An event payload could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl PipelineError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid repository code error.
    pub fn invalid_repository_code(code: impl Into<String>) -> Self {
        Self::InvalidRepositoryCode(code.into())
    }

    /// Create a record not found error.
    pub fn record_not_found(organization: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            organization: organization.into(),
            id: id.into(),
        }
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::Kafka(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
