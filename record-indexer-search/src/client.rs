//! Index client implementation.
//!
//! This module provides the version-independent entry point to the search
//! engine. Every write is folded into an [`IndexResult`]: rejected documents
//! and failed requests become failure entries instead of errors.

use std::future::Future;

use tracing::{debug, error, info, instrument, warn};

use crate::build_provider;
use crate::config::{EngineVersion, SearchEngineConfig};
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use record_indexer_shared::{sanitize_index_name, DataRecord, IndexResult};

/// Failure key used when a single write carries no identity.
const SYNTHETIC_KEY: &str = "0";

/// Failure key used when a whole bulk request failed.
const BULK_ERROR_KEY: &str = "error";

/// The main client for writing records to the search index.
pub struct IndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchEngineConfig,
}

impl IndexClient {
    /// Create a new IndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchEngineConfig::default(),
        }
    }

    /// Create a new IndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchEngineConfig) -> Self {
        Self { provider, config }
    }

    /// Build the provider for the configured engine version and wrap it.
    pub fn from_config(config: SearchEngineConfig) -> Result<Self, SearchIndexError> {
        let provider = build_provider(&config)?;
        Ok(Self::with_config(provider, config))
    }

    pub fn version(&self) -> EngineVersion {
        self.provider.version()
    }

    /// Run `call`, retrying connection and transport failures with exponential backoff.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, SearchIndexError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchIndexError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Search engine call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Create the index unless it already exists.
    ///
    /// # Returns
    ///
    /// `true` if the index already existed. Failures are logged and reported
    /// as `false`.
    pub async fn create_index_if_absent(&self, name: &str) -> bool {
        let index = sanitize_index_name(name);

        match self
            .with_retry("index_exists", || self.provider.index_exists(&index))
            .await
        {
            Ok(true) => {
                debug!(index = %index, "Index already exists");
                true
            }
            Ok(false) => {
                match self
                    .with_retry("create_index", || self.provider.create_index(&index))
                    .await
                {
                    Ok(()) => info!(index = %index, "Index created"),
                    Err(e) => error!(index = %index, error = %e, "Failed to create index"),
                }
                false
            }
            Err(e) => {
                error!(index = %index, error = %e, "Failed to check index existence");
                false
            }
        }
    }

    /// Index or replace one document.
    ///
    /// Successful iff the engine reports `created` or `updated`. Anything else
    /// becomes one failure entry keyed by `id`.
    pub async fn upsert(&self, index: &str, id: Option<&str>, record: &DataRecord) -> IndexResult {
        let target = sanitize_index_name(index);
        let key = id.unwrap_or(SYNTHETIC_KEY);

        match self
            .with_retry("index_document", || {
                self.provider.index_document(&target, id, record)
            })
            .await
        {
            Ok(outcome) if outcome.is_applied() => {
                debug!(index = %target, id = %key, result = %outcome.result, "Document indexed");
                IndexResult::new(index)
            }
            Ok(outcome) => {
                warn!(index = %target, id = %key, result = %outcome.result, "Document not indexed");
                IndexResult::failure(index, key, outcome.result)
            }
            Err(e) => {
                error!(index = %target, id = %key, error = %e, "Index document request failed");
                IndexResult::failure(index, key, e.to_string())
            }
        }
    }

    /// Merge `partial` into an existing document. A missing document is a failure.
    pub async fn update(&self, index: &str, id: &str, partial: &DataRecord) -> IndexResult {
        let target = sanitize_index_name(index);

        match self
            .with_retry("update_document", || {
                self.provider.update_document(&target, id, partial)
            })
            .await
        {
            Ok(outcome) if outcome.is_applied() => {
                debug!(index = %target, id = %id, result = %outcome.result, "Document updated");
                IndexResult::new(index)
            }
            Ok(outcome) => {
                warn!(index = %target, id = %id, result = %outcome.result, "Document not updated");
                IndexResult::failure(index, id, outcome.result)
            }
            Err(e) => {
                error!(index = %target, id = %id, error = %e, "Update document request failed");
                IndexResult::failure(index, id, e.to_string())
            }
        }
    }

    /// Delete one document. Successful iff the engine reports `deleted`.
    pub async fn delete(&self, index: &str, id: &str) -> IndexResult {
        let target = sanitize_index_name(index);

        match self
            .with_retry("delete_document", || self.provider.delete_document(&target, id))
            .await
        {
            Ok(outcome) if outcome.is_deleted() => {
                debug!(index = %target, id = %id, "Document deleted");
                IndexResult::new(index)
            }
            Ok(outcome) => {
                warn!(index = %target, id = %id, result = %outcome.result, "Document not deleted");
                IndexResult::failure(index, id, outcome.result)
            }
            Err(e) => {
                error!(index = %target, id = %id, error = %e, "Delete document request failed");
                IndexResult::failure(index, id, e.to_string())
            }
        }
    }

    /// Index a batch of records.
    ///
    /// Batches larger than the configured `docs_per_bulk_request` are split
    /// into several requests. Failed items are keyed by record identity, or by
    /// their position in `records` when the record has none. A request that
    /// fails entirely is reported under `"error"`.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name (sanitized before use)
    /// * `records` - Documents to index, in order
    ///
    /// # Returns
    ///
    /// One merged `IndexResult` for the whole batch.
    #[instrument(skip(self, records), fields(documents = records.len()))]
    pub async fn bulk_upsert(&self, index: &str, records: &[DataRecord]) -> IndexResult {
        let mut result = IndexResult::new(index);
        if records.is_empty() {
            return result;
        }

        let target = sanitize_index_name(index);
        let chunk_size = self
            .config
            .docs_per_bulk_request
            .unwrap_or(records.len())
            .max(1);

        for (chunk_number, chunk) in records.chunks(chunk_size).enumerate() {
            let offset = chunk_number * chunk_size;

            match self
                .with_retry("bulk_index", || self.provider.bulk_index(&target, chunk))
                .await
            {
                Ok(items) => {
                    for (position, (item, record)) in items.iter().zip(chunk).enumerate() {
                        if let Some(reason) = &item.error {
                            let key = record
                                .id()
                                .unwrap_or_else(|| (offset + position).to_string());
                            result.record_failure(key, reason.clone());
                        }
                    }
                    debug!(index = %target, offset, documents = chunk.len(), "Bulk chunk indexed");
                }
                Err(e) => {
                    error!(index = %target, offset, error = %e, "Bulk request failed");
                    result.record_failure(BULK_ERROR_KEY, e.to_string());
                }
            }
        }

        if !result.is_successful() {
            warn!(
                index = %target,
                failures = result.failure_data().len(),
                "Bulk upsert finished with failures"
            );
        }
        result
    }

    /// Liveness check. Errors are reported as `false`.
    pub async fn ping(&self) -> bool {
        match self.provider.ping().await {
            Ok(alive) => alive,
            Err(e) => {
                warn!(error = %e, "Search engine ping failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BulkItemOutcome, WriteOutcome};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Mock provider for testing
    struct MockProvider {
        exists: bool,
        write_result: String,
        failing_positions: HashSet<usize>,
        transport_failures: AtomicUsize,
        calls: Arc<AtomicUsize>,
        indices: Arc<Mutex<Vec<String>>>,
        bulk_sizes: Arc<Mutex<Vec<usize>>>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                exists: false,
                write_result: "created".to_string(),
                failing_positions: HashSet::new(),
                transport_failures: AtomicUsize::new(0),
                calls: Arc::new(AtomicUsize::new(0)),
                indices: Arc::new(Mutex::new(Vec::new())),
                bulk_sizes: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing_transport(times: usize) -> Self {
            let provider = Self::new();
            provider.transport_failures.store(times, Ordering::SeqCst);
            provider
        }

        async fn enter(&self, index: &str) -> Result<(), SearchIndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.indices.lock().await.push(index.to_string());
            let remaining = self.transport_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.transport_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(SearchIndexError::transport("connection refused"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        fn version(&self) -> EngineVersion {
            EngineVersion::V7
        }

        async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
            self.enter(index).await?;
            Ok(self.exists)
        }

        async fn create_index(&self, index: &str) -> Result<(), SearchIndexError> {
            self.enter(index).await
        }

        async fn index_document(
            &self,
            index: &str,
            _id: Option<&str>,
            _document: &DataRecord,
        ) -> Result<WriteOutcome, SearchIndexError> {
            self.enter(index).await?;
            Ok(WriteOutcome::new(self.write_result.clone()))
        }

        async fn update_document(
            &self,
            index: &str,
            _id: &str,
            _partial: &DataRecord,
        ) -> Result<WriteOutcome, SearchIndexError> {
            self.enter(index).await?;
            Ok(WriteOutcome::new(self.write_result.clone()))
        }

        async fn delete_document(
            &self,
            index: &str,
            _id: &str,
        ) -> Result<WriteOutcome, SearchIndexError> {
            self.enter(index).await?;
            Ok(WriteOutcome::new(self.write_result.clone()))
        }

        async fn bulk_index(
            &self,
            index: &str,
            documents: &[DataRecord],
        ) -> Result<Vec<BulkItemOutcome>, SearchIndexError> {
            self.enter(index).await?;
            self.bulk_sizes.lock().await.push(documents.len());
            Ok((0..documents.len())
                .map(|i| {
                    if self.failing_positions.contains(&i) {
                        BulkItemOutcome::failed("mapper_parsing_exception")
                    } else {
                        BulkItemOutcome::ok()
                    }
                })
                .collect())
        }

        async fn ping(&self) -> Result<bool, SearchIndexError> {
            Err(SearchIndexError::connection("refused"))
        }
    }

    fn fast_config() -> SearchEngineConfig {
        SearchEngineConfig {
            retry_wait: Duration::ZERO,
            ..SearchEngineConfig::default()
        }
    }

    fn records(count: usize) -> Vec<DataRecord> {
        (0..count)
            .map(|i| DataRecord::from_value(json!({"id": format!("r{i}"), "n": i})).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_create_index_if_absent_sanitizes_name() {
        let provider = MockProvider::new();
        let indices = provider.indices.clone();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let existed = client.create_index_if_absent("My Index").await;

        assert!(!existed);
        assert_eq!(*indices.lock().await, vec!["my_index", "my_index"]);
    }

    #[tokio::test]
    async fn test_create_index_if_absent_existing() {
        let mut provider = MockProvider::new();
        provider.exists = true;
        let calls = provider.calls.clone();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        assert!(client.create_index_if_absent("idx").await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_index_if_absent_swallows_errors() {
        let provider = MockProvider::failing_transport(100);
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        assert!(!client.create_index_if_absent("idx").await);
    }

    #[tokio::test]
    async fn test_upsert_success() {
        let client = IndexClient::with_config(Box::new(MockProvider::new()), fast_config());
        let record = records(1).remove(0);

        let result = client.upsert("idx1", Some("r0"), &record).await;

        assert!(result.is_successful());
        assert_eq!(result.index_name(), "idx1");
    }

    #[tokio::test]
    async fn test_upsert_unexpected_result_uses_synthetic_key() {
        let mut provider = MockProvider::new();
        provider.write_result = "noop".to_string();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.upsert("idx1", None, &DataRecord::new()).await;

        assert!(!result.is_successful());
        assert_eq!(result.failure_data()["0"], vec!["noop".to_string()]);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_failure() {
        let mut provider = MockProvider::new();
        provider.write_result = "[42]: document missing".to_string();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.update("idx1", "42", &DataRecord::new()).await;

        assert!(!result.is_successful());
        assert!(result.failure_data().contains_key("42"));
    }

    #[tokio::test]
    async fn test_delete_requires_deleted_result() {
        let mut provider = MockProvider::new();
        provider.write_result = "deleted".to_string();
        let client = IndexClient::with_config(Box::new(provider), fast_config());
        assert!(client.delete("idx1", "42").await.is_successful());

        let mut provider = MockProvider::new();
        provider.write_result = "not_found".to_string();
        let client = IndexClient::with_config(Box::new(provider), fast_config());
        let result = client.delete("idx1", "42").await;
        assert_eq!(result.failure_data()["42"], vec!["not_found".to_string()]);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let provider = MockProvider::failing_transport(2);
        let calls = provider.calls.clone();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.upsert("idx1", Some("1"), &DataRecord::new()).await;

        assert!(result.is_successful());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_failure_entry() {
        let provider = MockProvider::failing_transport(100);
        let calls = provider.calls.clone();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.upsert("idx1", Some("7"), &DataRecord::new()).await;

        assert!(!result.is_successful());
        assert!(result.failure_data()["7"][0].contains("connection refused"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_bulk_upsert_empty_batch_skips_wire() {
        let provider = MockProvider::new();
        let calls = provider.calls.clone();
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.bulk_upsert("idx1", &[]).await;

        assert!(result.is_successful());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bulk_upsert_keys_failures_by_identity() {
        let mut provider = MockProvider::new();
        provider.failing_positions = HashSet::from([1]);
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.bulk_upsert("idx1", &records(3)).await;

        assert!(!result.is_successful());
        assert_eq!(result.failure_data().len(), 1);
        assert_eq!(
            result.failure_data()["r1"],
            vec!["mapper_parsing_exception".to_string()]
        );
    }

    #[tokio::test]
    async fn test_bulk_upsert_without_identity_uses_global_positions() {
        let mut provider = MockProvider::new();
        provider.failing_positions = HashSet::from([0]);
        let sizes = provider.bulk_sizes.clone();
        let config = SearchEngineConfig {
            docs_per_bulk_request: Some(2),
            ..fast_config()
        };
        let client = IndexClient::with_config(Box::new(provider), config);
        let anonymous: Vec<DataRecord> = (0..5)
            .map(|i| DataRecord::from_value(json!({ "n": i })).unwrap())
            .collect();

        let result = client.bulk_upsert("idx1", &anonymous).await;

        assert_eq!(*sizes.lock().await, vec![2, 2, 1]);
        let keys: Vec<&String> = result.failure_data().keys().collect();
        assert_eq!(keys, vec!["0", "2", "4"]);
    }

    #[tokio::test]
    async fn test_failures_on_separate_pages_survive_merge() {
        let mut provider = MockProvider::new();
        provider.failing_positions = HashSet::from([0]);
        let client = IndexClient::with_config(Box::new(provider), fast_config());
        let page = |ids: [&str; 2]| -> Vec<DataRecord> {
            ids.iter()
                .map(|id| DataRecord::from_value(json!({ "id": id })).unwrap())
                .collect()
        };

        let first = client.bulk_upsert("idx1", &page(["A1", "A2"])).await;
        let second = client.bulk_upsert("idx1", &page(["B1", "B2"])).await;
        let merged = first.merge(second);

        assert!(!merged.is_successful());
        let keys: Vec<&String> = merged.failure_data().keys().collect();
        assert_eq!(keys, vec!["A1", "B1"]);
    }

    #[tokio::test]
    async fn test_bulk_upsert_transport_failure() {
        let provider = MockProvider::failing_transport(100);
        let client = IndexClient::with_config(Box::new(provider), fast_config());

        let result = client.bulk_upsert("idx1", &records(2)).await;

        assert!(!result.is_successful());
        assert_eq!(result.failure_data().len(), 1);
        assert!(result.failure_data().contains_key("error"));
    }

    #[tokio::test]
    async fn test_bulk_upsert_all_succeed() {
        let client = IndexClient::with_config(Box::new(MockProvider::new()), fast_config());

        let result = client.bulk_upsert("idx1", &records(4)).await;

        assert!(result.is_successful());
        assert!(result.failure_data().is_empty());
    }

    #[tokio::test]
    async fn test_ping_swallows_errors() {
        let client = IndexClient::new(Box::new(MockProvider::new()));
        assert!(!client.ping().await);
    }
}
