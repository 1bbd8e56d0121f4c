//! Study-based repository.
//!
//! Records are analyses grouped by study. A full scan lists every study via
//! `studies/all` and then pages through each study's analyses with
//! offset/limit pagination. The study id doubles as the organization.

use std::collections::BTreeSet;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::RepositoryError;
use crate::http::{endpoint, with_query, HttpClient};
use crate::repository::{RecordBatchStream, Repository};
use record_indexer_shared::{DataRecord, SongRepositoryConfig};

const IDENTITY_SOURCE: &str = "analysisId";
const OWNER_FIELD: &str = "studyId";

/// One parsed analysis page.
struct AnalysisPage {
    analyses: Vec<DataRecord>,
    total: Option<u64>,
}

impl AnalysisPage {
    /// Accepts `{analyses, totalAnalyses}` or a bare array of analyses.
    fn parse(body: Value) -> Option<Self> {
        match body {
            Value::Array(_) => Some(Self {
                analyses: DataRecord::batch_from_value(body)?,
                total: None,
            }),
            Value::Object(mut fields) => {
                let total = fields.get("totalAnalyses").and_then(Value::as_u64);
                let analyses = fields
                    .remove("analyses")
                    .or_else(|| fields.remove("records"))?;
                Some(Self {
                    analyses: DataRecord::batch_from_value(analyses)?,
                    total,
                })
            }
            _ => None,
        }
    }
}

/// Repository adapter for the study-based variant.
pub struct SongRepository {
    config: SongRepositoryConfig,
    http: HttpClient,
}

impl SongRepository {
    pub fn new(config: SongRepositoryConfig, http: HttpClient) -> Self {
        info!(
            code = %config.common.code,
            base_url = %config.common.base_url,
            pagination_size = ?config.common.pagination_size,
            study_states = ?config.indexable_study_states,
            analysis_centric = config.analysis_centric_enabled,
            organization = ?config.organization,
            country = ?config.country,
            "Created study repository"
        );
        Self { config, http }
    }

    fn states_param(states: &BTreeSet<String>) -> Option<(&'static str, String)> {
        if states.is_empty() {
            return None;
        }
        Some((
            "analysisStates",
            states.iter().map(String::as_str).collect::<Vec<_>>().join(","),
        ))
    }

    fn prepare(records: Vec<DataRecord>) -> Vec<DataRecord> {
        records
            .into_iter()
            .map(|record| record.with_identity_from(IDENTITY_SOURCE))
            .collect()
    }

    /// List every study id.
    async fn studies(&self) -> Result<Vec<String>, RepositoryError> {
        let url = endpoint(&self.config.common.base_url, &["studies", "all"])?;

        let Some(body) = self.http.get_json(&url).await? else {
            return Ok(Vec::new());
        };

        match body {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()),
            _ => {
                warn!(url = %url, "Unexpected study listing shape");
                Ok(Vec::new())
            }
        }
    }

    /// Page through the analyses of one study.
    fn analyses<'a>(&'a self, study: &'a str) -> RecordBatchStream<'a> {
        let page_size = self.config.common.pagination_size;
        let states = Self::states_param(&self.config.indexable_study_states);

        Box::pin(stream! {
            let listing = match page_size {
                Some(_) => endpoint(&self.config.common.base_url, &["studies", study, "analysis", "paginated"]),
                None => endpoint(&self.config.common.base_url, &["studies", study, "analysis"]),
            };
            let listing = match listing {
                Ok(url) => url,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut offset: u64 = 0;
            loop {
                let mut query = Vec::new();
                if let Some(param) = &states {
                    query.push(param.clone());
                }
                if let Some(limit) = page_size {
                    query.push(("limit", limit.to_string()));
                    query.push(("offset", offset.to_string()));
                }
                let url = with_query(&listing, &query);

                let body = match self.http.get_json(&url).await {
                    Ok(Some(body)) => body,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };

                let Some(page) = AnalysisPage::parse(body) else {
                    warn!(url = %url, "Unexpected analysis page shape");
                    break;
                };

                let received = page.analyses.len() as u64;
                debug!(url = %url, study = %study, analyses = received, "Fetched page");
                yield Ok(Self::prepare(page.analyses));

                offset += received;
                match (page_size, page.total) {
                    (Some(_), Some(total)) if offset < total && received > 0 => {}
                    _ => break,
                }
            }
        })
    }
}

#[async_trait]
impl Repository for SongRepository {
    fn stream_all(&self) -> RecordBatchStream<'_> {
        Box::pin(stream! {
            let studies = match self.studies().await {
                Ok(studies) => studies,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            debug!(studies = studies.len(), "Listed studies");

            for study in &studies {
                let mut batches = self.analyses(study);
                while let Some(batch) = batches.next().await {
                    let failed = batch.is_err();
                    yield batch;
                    if failed {
                        return;
                    }
                }
            }
        })
    }

    fn stream_by_organization<'a>(&'a self, organization: &'a str) -> RecordBatchStream<'a> {
        self.analyses(organization)
    }

    async fn get_record(&self, organization: &str, id: &str) -> Result<DataRecord, RepositoryError> {
        let url = endpoint(
            &self.config.common.base_url,
            &["studies", organization, "analysis", id],
        )?;

        let Some(record) = self.http.get_json(&url).await?.and_then(DataRecord::from_value) else {
            return Ok(DataRecord::new());
        };

        if record.get_str(OWNER_FIELD) != Some(organization) {
            debug!(id = %id, organization = %organization, "Analysis belongs to another study");
            return Ok(DataRecord::new());
        }

        Ok(record.with_identity_from(IDENTITY_SOURCE))
    }
}
