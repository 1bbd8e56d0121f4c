//! Kafka consumer implementation for the record indexer.
//!
//! Consumes record batches and index requests and hands each message to an
//! [`EventHandler`].

use futures::StreamExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::{BorrowedMessage, Message},
    Offset, TopicPartitionList,
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use crate::consumer::handler::EventHandler;
use crate::errors::PipelineError;

/// Kafka consumer for repository topics and the request topic.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topics: Vec<String>,
}

impl KafkaConsumer {
    /// Create a new Kafka consumer.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `group_id` - Consumer group ID
    /// * `topics` - Topics to subscribe to
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaConsumer)` - A new consumer instance
    /// * `Err(PipelineError)` - If consumer creation fails
    pub fn new(brokers: &str, group_id: &str, topics: Vec<String>) -> Result<Self, PipelineError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        info!(brokers = %brokers, group_id = %group_id, "Created Kafka consumer");

        Ok(Self { consumer, topics })
    }

    /// Subscribe to configured topics.
    pub fn subscribe(&self) -> Result<(), PipelineError> {
        if self.topics.is_empty() {
            return Err(PipelineError::kafka("No topics configured"));
        }

        let topics: Vec<&str> = self.topics.iter().map(|s| s.as_str()).collect();
        self.consumer
            .subscribe(&topics)
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        info!(topics = ?self.topics, "Subscribed to Kafka topics");
        Ok(())
    }

    /// Consume messages until shutdown or until the stream ends.
    ///
    /// # Arguments
    ///
    /// * `handler` - Handler each message is passed to
    /// * `shutdown` - Shutdown signal receiver
    #[instrument(skip(self, handler, shutdown))]
    pub async fn run(
        &self,
        handler: &EventHandler,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), PipelineError> {
        let mut message_stream = self.consumer.stream();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    break;
                }
                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            if let Err(e) = self.process_message(&msg, handler).await {
                                error!(error = %e, "Failed to process message");
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka error");
                        }
                        None => {
                            info!("Kafka stream ended");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle a single message and commit its offset.
    ///
    /// The offset is committed even when handling fails; a message that
    /// cannot be handled is logged and dropped.
    async fn process_message(
        &self,
        msg: &BorrowedMessage<'_>,
        handler: &EventHandler,
    ) -> Result<(), PipelineError> {
        let topic = msg.topic();
        let partition = msg.partition();
        let offset = msg.offset();

        debug!(
            topic = %topic,
            partition = partition,
            offset = offset,
            "Processing message"
        );

        match handler.handle(topic, msg.payload().unwrap_or_default()).await {
            Ok(Some(result)) if !result.is_successful() => {
                error!(
                    topic = %topic,
                    offset = offset,
                    index = %result.index_name(),
                    failures = ?result.failure_data(),
                    "Indexing finished with failures"
                );
            }
            Ok(Some(result)) => {
                debug!(topic = %topic, offset = offset, index = %result.index_name(), "Indexed message");
            }
            Ok(None) => {}
            Err(e) => {
                error!(topic = %topic, offset = offset, error = %e, "Dropping message");
            }
        }

        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(topic, partition, Offset::Offset(offset + 1))
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        self.consumer
            .commit(&tpl, CommitMode::Async)
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        Ok(())
    }
}
