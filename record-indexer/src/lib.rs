//! # Record Indexer
//!
//! Main library for the record indexer.
//!
//! This crate provides the entry point, configuration and logging bootstrap
//! for running the indexing pipeline.

pub mod config;
pub mod logging;

pub use config::{Dependencies, KafkaSettings, Settings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] record_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    Search(#[from] record_indexer_search::SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
