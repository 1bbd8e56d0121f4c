//! In-memory search provider shared by the pipeline tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use record_indexer_search::{
    BulkItemOutcome, EngineVersion, IndexClient, SearchEngineConfig, SearchIndexError,
    SearchIndexProvider, WriteOutcome,
};
use record_indexer_shared::DataRecord;

/// A record carrying only an identity.
pub fn record(id: &str) -> DataRecord {
    DataRecord::from_value(json!({ "id": id })).unwrap_or_default()
}

/// Calls observed by a [`RecordingProvider`], shared with the test body.
#[derive(Clone, Default)]
pub struct RecordedCalls {
    bulk: Arc<Mutex<Vec<(String, Vec<DataRecord>)>>>,
    indexed: Arc<Mutex<Vec<(String, Option<String>)>>>,
    deleted: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordedCalls {
    pub async fn bulk(&self) -> Vec<(String, Vec<DataRecord>)> {
        self.bulk.lock().await.clone()
    }

    pub async fn bulk_sizes(&self) -> Vec<usize> {
        self.bulk.lock().await.iter().map(|(_, docs)| docs.len()).collect()
    }

    pub async fn indexed(&self) -> Vec<(String, Option<String>)> {
        self.indexed.lock().await.clone()
    }

    pub async fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().await.clone()
    }

    pub async fn total(&self) -> usize {
        self.bulk.lock().await.len() + self.indexed.lock().await.len() + self.deleted.lock().await.len()
    }
}

/// Search provider that accepts every write and remembers it.
pub struct RecordingProvider {
    calls: RecordedCalls,
    failing_ids: HashSet<String>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            calls: RecordedCalls::default(),
            failing_ids: HashSet::new(),
        }
    }

    /// Reject bulk items whose identity is in `ids`.
    pub fn failing_ids(mut self, ids: &[&str]) -> Self {
        self.failing_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn calls(&self) -> RecordedCalls {
        self.calls.clone()
    }

    pub fn into_client(self) -> IndexClient {
        let config = SearchEngineConfig {
            retry_wait: Duration::ZERO,
            ..SearchEngineConfig::default()
        };
        IndexClient::with_config(Box::new(self), config)
    }
}

#[async_trait]
impl SearchIndexProvider for RecordingProvider {
    fn version(&self) -> EngineVersion {
        EngineVersion::V8
    }

    async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
        Ok(false)
    }

    async fn create_index(&self, _index: &str) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        _document: &DataRecord,
    ) -> Result<WriteOutcome, SearchIndexError> {
        self.calls
            .indexed
            .lock()
            .await
            .push((index.to_string(), id.map(str::to_string)));
        Ok(WriteOutcome::new("created"))
    }

    async fn update_document(
        &self,
        _index: &str,
        _id: &str,
        _partial: &DataRecord,
    ) -> Result<WriteOutcome, SearchIndexError> {
        Ok(WriteOutcome::new("updated"))
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<WriteOutcome, SearchIndexError> {
        self.calls
            .deleted
            .lock()
            .await
            .push((index.to_string(), id.to_string()));
        Ok(WriteOutcome::new("deleted"))
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[DataRecord],
    ) -> Result<Vec<BulkItemOutcome>, SearchIndexError> {
        self.calls
            .bulk
            .lock()
            .await
            .push((index.to_string(), documents.to_vec()));

        Ok(documents
            .iter()
            .map(|doc| match doc.id() {
                Some(id) if self.failing_ids.contains(&id) => {
                    BulkItemOutcome::failed("mapper_parsing_exception")
                }
                _ => BulkItemOutcome::ok(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}
