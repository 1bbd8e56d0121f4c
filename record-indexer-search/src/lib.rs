//! # Record Indexer Search
//!
//! This crate provides the index adapter used by the record indexer. It
//! includes the provider abstraction over the search engine, concrete
//! providers for the Elasticsearch 7 and 8 protocols, and [`IndexClient`],
//! which turns every write into an [`IndexResult`](record_indexer_shared::IndexResult).

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
mod provider_impl;
pub mod types;
pub mod v7;
pub mod v8;
mod wire;

pub use client::IndexClient;
pub use config::{BasicAuth, EngineVersion, SearchEngineConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use types::{BulkItemOutcome, WriteOutcome};

/// Build the provider matching the configured engine version.
///
/// # Arguments
///
/// * `config` - Engine connection settings
///
/// # Returns
///
/// * `Ok(Box<dyn SearchIndexProvider>)` - A provider speaking the configured protocol
/// * `Err(SearchIndexError)` - If the node URL or transport settings are invalid
pub fn build_provider(
    config: &SearchEngineConfig,
) -> Result<Box<dyn SearchIndexProvider>, SearchIndexError> {
    match config.version {
        EngineVersion::V7 => Ok(Box::new(v7::OpenSearchProvider::new(config)?)),
        EngineVersion::V8 => Ok(Box::new(v8::ElasticsearchProvider::new(config)?)),
    }
}
