//! The interface every repository variant exposes.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::RepositoryError;
use record_indexer_shared::DataRecord;

/// Lazy sequence of record batches, one batch per upstream page.
///
/// The stream is finite. A transport error is yielded once and ends the
/// stream; a non-success status or malformed page ends it silently.
pub type RecordBatchStream<'a> = BoxStream<'a, Result<Vec<DataRecord>, RepositoryError>>;

/// Read access to one upstream repository.
///
/// Every call to a stream method starts a fresh scan with its own cursor, so
/// streams may be created repeatedly and concurrently.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Every record in the repository, page by page.
    fn stream_all(&self) -> RecordBatchStream<'_>;

    /// Every record belonging to `organization`, page by page.
    fn stream_by_organization<'a>(&'a self, organization: &'a str) -> RecordBatchStream<'a>;

    /// Fetch a single record.
    ///
    /// # Returns
    ///
    /// * `Ok(DataRecord)` - The record, or an empty record when the upstream
    ///   answered with a non-success status or the record belongs to a
    ///   different organization
    /// * `Err(RepositoryError)` - If the request failed on the wire
    async fn get_record(&self, organization: &str, id: &str) -> Result<DataRecord, RepositoryError>;
}
