//! Dependency initialization and wiring for the record indexer.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::IndexingError;
use record_indexer_pipeline::{EventHandler, KafkaConsumer, Orchestrator, SearchLoader};
use record_indexer_repository::HttpClient;
use record_indexer_search::IndexClient;

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub settings: Settings,
    /// The configured orchestrator, shared with the event consumer.
    pub orchestrator: Arc<Orchestrator>,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// Creates the search engine client, checks that the engine is
    /// reachable, and ensures every configured index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a client cannot be created
    pub async fn new(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            nodes = ?settings.search.nodes,
            version = %settings.search.version,
            repositories = settings.repositories.len(),
            kafka_enabled = settings.kafka.is_some(),
            "Initializing dependencies"
        );

        let index_client = IndexClient::from_config(settings.search.clone())?;
        info!(protocol = %index_client.version(), "Created index client");

        let loader = SearchLoader::new(Arc::new(index_client));
        if loader.health_check().await {
            info!("Search engine connection verified");
        } else {
            warn!("Search engine did not answer ping");
        }

        let http = HttpClient::new(settings.http_timeout).map_err(|e| {
            IndexingError::config(format!("Failed to create repository HTTP client: {}", e))
        })?;

        let orchestrator = Orchestrator::new(settings.repositories.clone(), http, loader);
        orchestrator.ensure_indices().await;

        Ok(Self {
            settings,
            orchestrator: Arc::new(orchestrator),
        })
    }

    /// Build the Kafka consumer and the handler it feeds.
    ///
    /// # Returns
    ///
    /// * `Ok((KafkaConsumer, EventHandler))` - A consumer for every configured topic
    /// * `Err(IndexingError)` - If no broker or no topic is configured, or the
    ///   consumer cannot be created
    pub fn event_consumer(&self) -> Result<(KafkaConsumer, EventHandler), IndexingError> {
        let kafka = self
            .settings
            .kafka
            .as_ref()
            .ok_or_else(|| IndexingError::config("KAFKA_BROKER is not set"))?;

        let handler = EventHandler::new(self.orchestrator.clone(), kafka.request_topic.clone());
        let topics = handler.topics();
        if topics.is_empty() {
            return Err(IndexingError::config(
                "No Kafka topics configured: set KAFKA_REQUEST_TOPIC or a repository KAFKA_TOPIC",
            ));
        }

        let consumer = KafkaConsumer::new(&kafka.broker, &kafka.group_id, topics)?;
        Ok((consumer, handler))
    }
}
