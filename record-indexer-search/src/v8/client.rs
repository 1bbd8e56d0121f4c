//! Elasticsearch 8 client implementation.

use elasticsearch::{
    auth::Credentials,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    http::Url,
    Elasticsearch,
};
use tracing::info;

use crate::config::{EngineVersion, SearchEngineConfig};
use crate::errors::SearchIndexError;
use crate::provider_impl::impl_search_index_provider;

/// Version 8 provider backed by the official Elasticsearch client.
pub struct ElasticsearchProvider {
    client: Elasticsearch,
}

impl ElasticsearchProvider {
    /// Create a new provider connected to the configured node.
    pub fn new(config: &SearchEngineConfig) -> Result<Self, SearchIndexError> {
        let node = config.primary_node()?;
        let parsed_url: Url = node
            .parse()
            .map_err(|e| SearchIndexError::connection(format!("Invalid URL: {e}")))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = config.connection_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(auth) = &config.basic_auth {
            builder = builder.auth(Credentials::Basic(auth.user.clone(), auth.password.clone()));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(format!("Failed to build transport: {e}")))?;

        info!(url = %node, version = 8, "Created search engine client");

        Ok(Self {
            client: Elasticsearch::new(transport),
        })
    }
}

impl_search_index_provider!(ElasticsearchProvider, elasticsearch, EngineVersion::V8);
