//! Elasticsearch 8 protocol provider.

mod client;

pub use client::ElasticsearchProvider;
