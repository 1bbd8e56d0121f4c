//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! for the version 7 protocol using the OpenSearch Rust client.

use opensearch::{
    auth::Credentials,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    OpenSearch,
};
use tracing::info;
use url::Url;

use crate::config::{EngineVersion, SearchEngineConfig};
use crate::errors::SearchIndexError;
use crate::provider_impl::impl_search_index_provider;

/// Version 7 provider backed by the OpenSearch client.
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new provider connected to the configured node.
    ///
    /// # Arguments
    ///
    /// * `config` - Node URL, credentials and timeout
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or transport setup fails
    pub fn new(config: &SearchEngineConfig) -> Result<Self, SearchIndexError> {
        let node = config.primary_node()?;
        let parsed_url = Url::parse(node).map_err(|e| SearchIndexError::connection(e.to_string()))?;

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
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(url = %node, version = 7, "Created search engine client");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }
}

impl_search_index_provider!(OpenSearchProvider, opensearch, EngineVersion::V7);
