//! Provider body shared by the version 7 and version 8 clients.
//!
//! Both client crates expose the same request builders under the same paths,
//! so one expansion keeps the two protocols from drifting apart.

/// Implement [`SearchIndexProvider`](crate::interfaces::SearchIndexProvider)
/// for a provider struct holding a `client` field of `$client_crate`'s client type.
macro_rules! impl_search_index_provider {
    ($provider:ident, $client_crate:ident, $version:expr) => {
        impl $provider {
            async fn read(
                response: $client_crate::http::response::Response,
            ) -> Result<(u16, String), $crate::errors::SearchIndexError> {
                let status = response.status_code().as_u16();
                let text = response
                    .text()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;
                Ok((status, text))
            }
        }

        #[::async_trait::async_trait]
        impl $crate::interfaces::SearchIndexProvider for $provider {
            fn version(&self) -> $crate::config::EngineVersion {
                $version
            }

            async fn index_exists(
                &self,
                index: &str,
            ) -> Result<bool, $crate::errors::SearchIndexError> {
                let response = self
                    .client
                    .indices()
                    .exists($client_crate::indices::IndicesExistsParts::Index(&[index]))
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;

                let (status, text) = Self::read(response).await?;
                $crate::wire::index_exists(status, $crate::wire::parse_body(&text).as_ref())
            }

            async fn create_index(&self, index: &str) -> Result<(), $crate::errors::SearchIndexError> {
                let response = self
                    .client
                    .indices()
                    .create($client_crate::indices::IndicesCreateParts::Index(index))
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;

                let (status, text) = Self::read(response).await?;
                $crate::wire::index_created(status, &text)
            }

            async fn index_document(
                &self,
                index: &str,
                id: Option<&str>,
                document: &::record_indexer_shared::DataRecord,
            ) -> Result<$crate::types::WriteOutcome, $crate::errors::SearchIndexError> {
                let parts = match id {
                    Some(id) => $client_crate::IndexParts::IndexId(index, id),
                    None => $client_crate::IndexParts::Index(index),
                };
                let response = self
                    .client
                    .index(parts)
                    .body(document)
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;

                let (status, text) = Self::read(response).await?;
                ::tracing::debug!(index = %index, status, "Index document response");
                $crate::wire::write_outcome(status, $crate::wire::parse_body(&text).as_ref())
            }

            async fn update_document(
                &self,
                index: &str,
                id: &str,
                partial: &::record_indexer_shared::DataRecord,
            ) -> Result<$crate::types::WriteOutcome, $crate::errors::SearchIndexError> {
                let response = self
                    .client
                    .update($client_crate::UpdateParts::IndexId(index, id))
                    .body(::serde_json::json!({ "doc": partial }))
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;

                let (status, text) = Self::read(response).await?;
                ::tracing::debug!(index = %index, id = %id, status, "Update document response");
                $crate::wire::write_outcome(status, $crate::wire::parse_body(&text).as_ref())
            }

            async fn delete_document(
                &self,
                index: &str,
                id: &str,
            ) -> Result<$crate::types::WriteOutcome, $crate::errors::SearchIndexError> {
                let response = self
                    .client
                    .delete($client_crate::DeleteParts::IndexId(index, id))
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;

                let (status, text) = Self::read(response).await?;
                ::tracing::debug!(index = %index, id = %id, status, "Delete document response");
                $crate::wire::write_outcome(status, $crate::wire::parse_body(&text).as_ref())
            }

            async fn bulk_index(
                &self,
                index: &str,
                documents: &[::record_indexer_shared::DataRecord],
            ) -> Result<Vec<$crate::types::BulkItemOutcome>, $crate::errors::SearchIndexError> {
                let body: Vec<$client_crate::http::request::JsonBody<::serde_json::Value>> =
                    $crate::wire::bulk_lines(index, documents)
                        .into_iter()
                        .map($client_crate::http::request::JsonBody::new)
                        .collect();

                let response = self
                    .client
                    .bulk($client_crate::BulkParts::Index(index))
                    .refresh($client_crate::params::Refresh::True)
                    .body(body)
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::transport(e.to_string()))?;

                let (status, text) = Self::read(response).await?;
                ::tracing::debug!(index = %index, documents = documents.len(), status, "Bulk response");
                $crate::wire::bulk_items(status, $crate::wire::parse_body(&text).as_ref())
            }

            async fn ping(&self) -> Result<bool, $crate::errors::SearchIndexError> {
                let response = self
                    .client
                    .ping()
                    .send()
                    .await
                    .map_err(|e| $crate::errors::SearchIndexError::connection(e.to_string()))?;
                Ok(response.status_code().is_success())
            }
        }
    };
}

pub(crate) use impl_search_index_provider;
