//! Orchestrator module for the record indexer pipeline.
//!
//! Resolves repositories by code and coordinates the repository adapters
//! with the loader.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use crate::loader::SearchLoader;
use record_indexer_repository::{repository_for, HttpClient, Repository};
use record_indexer_shared::{find_repository, DataRecord, IndexResult, RepositoryConfig};

/// A repository resolved from configuration together with its adapter.
struct Resolved<'a> {
    config: &'a RepositoryConfig,
    adapter: Arc<dyn Repository>,
}

/// Orchestrator that exposes the indexing operations.
///
/// Every operation validates its inputs and resolves the repository code
/// before touching the network. Streaming operations accumulate one
/// [`IndexResult`] across all batches and return it once the scan is done.
pub struct Orchestrator {
    repositories: Vec<RepositoryConfig>,
    adapters: HashMap<String, Arc<dyn Repository>>,
    loader: SearchLoader,
}

impl Orchestrator {
    /// Create a new orchestrator, building one adapter per configured repository.
    pub fn new(repositories: Vec<RepositoryConfig>, http: HttpClient, loader: SearchLoader) -> Self {
        let adapters = repositories
            .iter()
            .map(|config| {
                (
                    config.code().to_string(),
                    repository_for(config, http.clone()),
                )
            })
            .collect();

        Self {
            repositories,
            adapters,
            loader,
        }
    }

    /// Configured repositories.
    pub fn repositories(&self) -> &[RepositoryConfig] {
        &self.repositories
    }

    pub fn loader(&self) -> &SearchLoader {
        &self.loader
    }

    /// Create every configured index that does not exist yet.
    pub async fn ensure_indices(&self) {
        for config in &self.repositories {
            let existed = self.loader.ensure_index(config.index_name()).await;
            info!(
                repository = %config.code(),
                kind = %config.kind(),
                index = %config.index_name(),
                existed,
                "Ensured index"
            );
        }
    }

    /// Index every record of a repository.
    #[instrument(skip(self))]
    pub async fn index_repository(&self, repo_code: &str) -> Result<IndexResult, PipelineError> {
        let repo_code = required("repository code", repo_code)?;
        let resolved = self.resolve(repo_code)?;

        info!(index = %resolved.config.index_name(), "Indexing repository");
        self.loader
            .load_stream(resolved.config.index_name(), resolved.adapter.stream_all())
            .await
    }

    /// Index every record of one organization within a repository.
    #[instrument(skip(self))]
    pub async fn index_organization(
        &self,
        repo_code: &str,
        organization: &str,
    ) -> Result<IndexResult, PipelineError> {
        let repo_code = required("repository code", repo_code)?;
        let organization = required("organization", organization)?;
        let resolved = self.resolve(repo_code)?;

        info!(index = %resolved.config.index_name(), "Indexing organization");
        self.loader
            .load_stream(
                resolved.config.index_name(),
                resolved.adapter.stream_by_organization(organization),
            )
            .await
    }

    /// Fetch one record and index it.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexResult)` - The write result; a repository transport error
    ///   is reported as a failed entry keyed by the record id
    /// * `Err(PipelineError::RecordNotFound)` - If the record does not exist
    ///   under the organization
    #[instrument(skip(self))]
    pub async fn index_record(
        &self,
        repo_code: &str,
        organization: &str,
        record_id: &str,
    ) -> Result<IndexResult, PipelineError> {
        let (resolved, organization, record_id) =
            self.resolve_record_request(repo_code, organization, record_id)?;
        let index = resolved.config.index_name();

        let record = match self.fetch(&resolved, organization, record_id).await? {
            Ok(record) => record,
            Err(failed) => return Ok(failed),
        };

        let id = record.id().unwrap_or_else(|| record_id.to_string());
        Ok(self.loader.client().upsert(index, Some(&id), &record).await)
    }

    /// Remove one record from the index after confirming it exists under the
    /// organization.
    #[instrument(skip(self))]
    pub async fn remove_index_record(
        &self,
        repo_code: &str,
        organization: &str,
        record_id: &str,
    ) -> Result<IndexResult, PipelineError> {
        let (resolved, organization, record_id) =
            self.resolve_record_request(repo_code, organization, record_id)?;
        let index = resolved.config.index_name();

        if let Err(failed) = self.fetch(&resolved, organization, record_id).await? {
            return Ok(failed);
        }

        Ok(self.loader.client().delete(index, record_id).await)
    }

    fn resolve(&self, repo_code: &str) -> Result<Resolved<'_>, PipelineError> {
        let config = find_repository(&self.repositories, repo_code)
            .ok_or_else(|| PipelineError::invalid_repository_code(repo_code))?;
        let adapter = self
            .adapters
            .get(config.code())
            .cloned()
            .ok_or_else(|| PipelineError::invalid_repository_code(repo_code))?;

        Ok(Resolved { config, adapter })
    }

    fn resolve_record_request<'a>(
        &self,
        repo_code: &'a str,
        organization: &'a str,
        record_id: &'a str,
    ) -> Result<(Resolved<'_>, &'a str, &'a str), PipelineError> {
        let repo_code = required("repository code", repo_code)?;
        let organization = required("organization", organization)?;
        let record_id = required("record id", record_id)?;

        Ok((self.resolve(repo_code)?, organization, record_id))
    }

    /// Look up one record. The inner `Err` carries a failed result for a
    /// transport error; a missing record is a typed failure.
    async fn fetch(
        &self,
        resolved: &Resolved<'_>,
        organization: &str,
        record_id: &str,
    ) -> Result<Result<DataRecord, IndexResult>, PipelineError> {
        let index = resolved.config.index_name();

        match resolved.adapter.get_record(organization, record_id).await {
            Ok(record) if record.is_empty() => {
                Err(PipelineError::record_not_found(organization, record_id))
            }
            Ok(record) => Ok(Ok(record)),
            Err(e) => {
                warn!(error = %e, id = %record_id, "Failed to fetch record");
                Ok(Err(IndexResult::failure(index, record_id, e.to_string())))
            }
        }
    }
}

/// Trim a caller-supplied value and reject it when nothing is left.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, PipelineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
