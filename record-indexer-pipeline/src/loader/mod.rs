//! Loader module for the record indexer pipeline.
//!
//! Writes record batches into the search index and folds the per-batch
//! results into one result per operation.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use record_indexer_repository::RecordBatchStream;
use record_indexer_search::IndexClient;
use record_indexer_shared::{DataRecord, IndexResult};

/// Loader that indexes record batches into the search engine.
#[derive(Clone)]
pub struct SearchLoader {
    client: Arc<IndexClient>,
}

impl SearchLoader {
    /// Create a new search loader with the given client.
    pub fn new(client: Arc<IndexClient>) -> Self {
        Self { client }
    }

    /// The underlying index client, for single-document writes.
    pub fn client(&self) -> &IndexClient {
        &self.client
    }

    /// Index one batch of records.
    pub async fn load_batch(&self, index: &str, records: &[DataRecord]) -> IndexResult {
        self.client.bulk_upsert(index, records).await
    }

    /// Drain a repository stream into the index, one bulk write per batch.
    ///
    /// A failed batch does not stop the scan; its failures are merged into the
    /// returned result. A repository transport error halts the scan and is
    /// returned as an error.
    #[instrument(skip(self, batches))]
    pub async fn load_stream(
        &self,
        index: &str,
        mut batches: RecordBatchStream<'_>,
    ) -> Result<IndexResult, PipelineError> {
        let mut result = IndexResult::new(index);
        let mut batch_count = 0usize;
        let mut record_count = 0usize;

        while let Some(batch) = batches.next().await {
            let records = batch?;
            batch_count += 1;
            record_count += records.len();

            let batch_result = self.load_batch(index, &records).await;
            debug!(
                batch = batch_count,
                records = records.len(),
                successful = batch_result.is_successful(),
                "Loaded batch"
            );
            result = result.merge(batch_result);
        }

        info!(
            batches = batch_count,
            records = record_count,
            successful = result.is_successful(),
            failures = result.failure_data().len(),
            "Finished loading stream"
        );
        Ok(result)
    }

    /// Ensure the search index exists. Returns whether it already existed.
    pub async fn ensure_index(&self, index: &str) -> bool {
        self.client.create_index_if_absent(index).await
    }

    /// Check if the search engine is reachable.
    pub async fn health_check(&self) -> bool {
        self.client.ping().await
    }
}
