//! Elasticsearch 7 protocol provider.
//!
//! The 7.x document, index and bulk APIs are served through the OpenSearch
//! client, which stays wire compatible with them.

mod client;

pub use client::OpenSearchProvider;
