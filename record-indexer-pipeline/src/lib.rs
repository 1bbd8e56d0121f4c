//! # Record Indexer Pipeline
//!
//! This crate provides the pipeline components that move records from
//! upstream repositories into the search index.
//!
//! ## Architecture
//!
//! 1. **Orchestrator**: Resolves a repository by code and drives
//!    repository streams into the loader
//! 2. **Loader**: Writes record batches and merges their results
//! 3. **Consumer**: Receives record batches and index requests from Kafka

pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;

#[cfg(test)]
mod test_support;

pub use consumer::{EventHandler, KafkaConsumer};
pub use errors::PipelineError;
pub use loader::SearchLoader;
pub use orchestrator::Orchestrator;
