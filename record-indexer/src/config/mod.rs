//! Configuration and dependency wiring for the record indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{KafkaSettings, Settings};
