//! Consumer module for the record indexer pipeline.
//!
//! Provides Kafka consumer functionality for receiving record batches and
//! index requests.

mod handler;
mod kafka_consumer;
mod messages;

pub use handler::EventHandler;
pub use kafka_consumer::KafkaConsumer;
pub use messages::{decode_record_batch, IndexCommand, IndexRequestMessage};
