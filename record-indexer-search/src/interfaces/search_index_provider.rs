//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for one implementation per engine protocol version.

use async_trait::async_trait;

use crate::config::EngineVersion;
use crate::errors::SearchIndexError;
use crate::types::{BulkItemOutcome, WriteOutcome};
use record_indexer_shared::DataRecord;

/// Abstracts one major protocol version of the search engine.
///
/// Implementations are injected into `IndexClient`, which sanitizes index
/// names, retries failed calls and folds outcomes into `IndexResult`s.
/// Providers only speak the wire protocol: a rejected write is an `Ok`
/// outcome, an `Err` means the request itself failed.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Protocol version this provider speaks.
    fn version(&self) -> EngineVersion;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index. An index that already exists is not an error.
    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Index or replace a single document.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index, already sanitized
    /// * `id` - Document identity; `None` lets the engine assign one
    /// * `document` - The record to store
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome)` - The engine's verdict on the write
    /// * `Err(SearchIndexError)` - If the request failed on the wire
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &DataRecord,
    ) -> Result<WriteOutcome, SearchIndexError>;

    /// Merge `partial` into an existing document. A missing document is not created.
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &DataRecord,
    ) -> Result<WriteOutcome, SearchIndexError>;

    /// Delete a single document.
    async fn delete_document(&self, index: &str, id: &str)
        -> Result<WriteOutcome, SearchIndexError>;

    /// Index many documents in one bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BulkItemOutcome>)` - One outcome per document, in input order
    /// * `Err(SearchIndexError)` - If the bulk request failed entirely
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[DataRecord],
    ) -> Result<Vec<BulkItemOutcome>, SearchIndexError>;

    /// Liveness check.
    async fn ping(&self) -> Result<bool, SearchIndexError>;
}
