//! Routes consumed messages to the loader or the orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::consumer::messages::{decode_record_batch, IndexCommand, IndexRequestMessage};
use crate::errors::PipelineError;
use crate::orchestrator::Orchestrator;
use record_indexer_shared::IndexResult;

/// Handles one message at a time, independent of the Kafka client.
pub struct EventHandler {
    orchestrator: Arc<Orchestrator>,
    request_topic: Option<String>,
    topic_indices: HashMap<String, String>,
}

impl EventHandler {
    /// Create a handler for every repository with a configured topic, plus
    /// the optional shared request topic.
    pub fn new(orchestrator: Arc<Orchestrator>, request_topic: Option<String>) -> Self {
        let topic_indices = orchestrator
            .repositories()
            .iter()
            .filter_map(|config| {
                config
                    .kafka_topic()
                    .map(|topic| (topic.to_string(), config.index_name().to_string()))
            })
            .collect();

        Self {
            orchestrator,
            request_topic: request_topic.filter(|t| !t.trim().is_empty()),
            topic_indices,
        }
    }

    /// Topics this handler consumes.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.request_topic.iter().cloned().collect();
        let mut repository_topics: Vec<String> = self
            .topic_indices
            .keys()
            .filter(|topic| Some(*topic) != self.request_topic.as_ref())
            .cloned()
            .collect();
        repository_topics.sort();
        topics.extend(repository_topics);
        topics
    }

    /// Handle one message.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(IndexResult))` - The result of the write the message caused
    /// * `Ok(None)` - If the message was skipped
    /// * `Err(PipelineError)` - If the payload or the requested operation failed
    pub async fn handle(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> Result<Option<IndexResult>, PipelineError> {
        if payload.is_empty() {
            debug!(topic = %topic, "Received message with empty payload");
            return Ok(None);
        }

        if self.request_topic.as_deref() == Some(topic) {
            let command = IndexRequestMessage::decode(payload)?.command()?;
            return self.dispatch(command).await.map(Some);
        }

        let Some(index) = self.topic_indices.get(topic) else {
            warn!(topic = %topic, "Unknown topic");
            return Ok(None);
        };

        let records = decode_record_batch(payload)?;
        debug!(topic = %topic, index = %index, records = records.len(), "Loading batch");
        Ok(Some(self.orchestrator.loader().load_batch(index, &records).await))
    }

    async fn dispatch(&self, command: IndexCommand) -> Result<IndexResult, PipelineError> {
        info!(command = ?command, "Handling index request");

        match command {
            IndexCommand::Repository { repository_code } => {
                self.orchestrator.index_repository(&repository_code).await
            }
            IndexCommand::Organization {
                repository_code,
                organization,
            } => {
                self.orchestrator
                    .index_organization(&repository_code, &organization)
                    .await
            }
            IndexCommand::Record {
                repository_code,
                organization,
                id,
            } => {
                self.orchestrator
                    .index_record(&repository_code, &organization, &id)
                    .await
            }
            IndexCommand::Remove {
                repository_code,
                organization,
                id,
            } => {
                self.orchestrator
                    .remove_index_record(&repository_code, &organization, &id)
                    .await
            }
        }
    }
}
