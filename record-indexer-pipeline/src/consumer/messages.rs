//! Message types for the event consumer.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::PipelineError;
use record_indexer_shared::DataRecord;

/// An index request received on the shared request topic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequestMessage {
    pub repository_code: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub remove: bool,
}

/// The orchestrator operation an [`IndexRequestMessage`] asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCommand {
    Repository {
        repository_code: String,
    },
    Organization {
        repository_code: String,
        organization: String,
    },
    Record {
        repository_code: String,
        organization: String,
        id: String,
    },
    Remove {
        repository_code: String,
        organization: String,
        id: String,
    },
}

impl IndexRequestMessage {
    /// Decode a request from a raw payload.
    pub fn decode(payload: &[u8]) -> Result<Self, PipelineError> {
        serde_json::from_slice(payload)
            .map_err(|e| PipelineError::parse(format!("Invalid index request: {}", e)))
    }

    /// Map the request onto an operation.
    ///
    /// A record id without an organization cannot be resolved, and removal
    /// needs both.
    pub fn command(self) -> Result<IndexCommand, PipelineError> {
        let repository_code = self.repository_code;
        let organization = self.organization.filter(|o| !o.trim().is_empty());
        let id = self.id.filter(|i| !i.trim().is_empty());

        match (organization, id, self.remove) {
            (Some(organization), Some(id), true) => Ok(IndexCommand::Remove {
                repository_code,
                organization,
                id,
            }),
            (_, _, true) => Err(PipelineError::validation(
                "remove requires an organization and an id",
            )),
            (Some(organization), Some(id), false) => Ok(IndexCommand::Record {
                repository_code,
                organization,
                id,
            }),
            (None, Some(_), false) => Err(PipelineError::validation(
                "a record id requires an organization",
            )),
            (Some(organization), None, false) => Ok(IndexCommand::Organization {
                repository_code,
                organization,
            }),
            (None, None, false) => Ok(IndexCommand::Repository { repository_code }),
        }
    }
}

/// Decode a repository-topic payload into one batch of records.
///
/// Accepts a JSON array of objects or a single object.
pub fn decode_record_batch(payload: &[u8]) -> Result<Vec<DataRecord>, PipelineError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| PipelineError::parse(format!("Invalid record batch: {}", e)))?;

    match value {
        Value::Array(_) => DataRecord::batch_from_value(value)
            .ok_or_else(|| PipelineError::parse("Record batch must contain only objects")),
        Value::Object(fields) => Ok(vec![DataRecord::from(fields)]),
        _ => Err(PipelineError::parse("Record batch must be an array or an object")),
    }
}
