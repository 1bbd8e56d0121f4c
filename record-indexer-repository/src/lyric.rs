//! Category-based repository.
//!
//! Records live under a numeric category and are listed through
//! `data/category/{categoryId}[/organization/{org}]` with page-number
//! pagination. Each record carries its identity in `systemId` and its owner in
//! `organization`.

use async_stream::stream;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::RepositoryError;
use crate::http::{endpoint, with_query, HttpClient};
use crate::repository::{RecordBatchStream, Repository};
use record_indexer_shared::{DataRecord, LyricRepositoryConfig};

const IDENTITY_SOURCE: &str = "systemId";
const OWNER_FIELD: &str = "organization";
const VALIDITY_FIELD: &str = "isValid";
const VIEW: &str = "compound";

/// One parsed listing page.
struct Page {
    records: Vec<DataRecord>,
    total_pages: Option<u64>,
}

impl Page {
    /// Accepts `{records, pagination: {totalPages}}` or a bare array of records.
    fn parse(body: Value) -> Option<Self> {
        match body {
            Value::Array(_) => Some(Self {
                records: DataRecord::batch_from_value(body)?,
                total_pages: None,
            }),
            Value::Object(mut fields) => {
                let total_pages = fields
                    .get("pagination")
                    .and_then(|p| p.get("totalPages"))
                    .and_then(Value::as_u64);
                let records = DataRecord::batch_from_value(fields.remove("records")?)?;
                Some(Self {
                    records,
                    total_pages,
                })
            }
            _ => None,
        }
    }
}

/// Repository adapter for the category-based variant.
pub struct LyricRepository {
    config: LyricRepositoryConfig,
    http: HttpClient,
}

impl LyricRepository {
    pub fn new(config: LyricRepositoryConfig, http: HttpClient) -> Self {
        info!(
            code = %config.common.code,
            base_url = %config.common.base_url,
            category_id = config.category_id,
            pagination_size = ?config.common.pagination_size,
            "Created category repository"
        );
        Self { config, http }
    }

    fn category_segment(&self) -> String {
        self.config.category_id.to_string()
    }

    /// Normalize the identity and drop invalid records when configured to.
    fn prepare(&self, records: Vec<DataRecord>) -> Vec<DataRecord> {
        records
            .into_iter()
            .filter(|record| {
                !self.config.valid_data_only
                    || record.get(VALIDITY_FIELD).and_then(Value::as_bool) != Some(false)
            })
            .map(|record| record.with_identity_from(IDENTITY_SOURCE))
            .collect()
    }

    /// Walk the listing at `listing` page by page.
    fn paginate(&self, listing: Result<Url, RepositoryError>) -> RecordBatchStream<'_> {
        let page_size = self.config.common.pagination_size;

        Box::pin(stream! {
            let listing = match listing {
                Ok(url) => url,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut page: u64 = 1;
            loop {
                let mut query = vec![("view", VIEW.to_string())];
                if let Some(size) = page_size {
                    query.push(("pageSize", size.to_string()));
                    query.push(("page", page.to_string()));
                }
                let url = with_query(&listing, &query);

                let body = match self.http.get_json(&url).await {
                    Ok(Some(body)) => body,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };

                let Some(parsed) = Page::parse(body) else {
                    warn!(url = %url, "Unexpected listing page shape");
                    break;
                };

                let received = parsed.records.len();
                debug!(url = %url, page, records = received, "Fetched page");
                yield Ok(self.prepare(parsed.records));

                match (page_size, parsed.total_pages) {
                    (Some(_), Some(total)) if page < total && received > 0 => page += 1,
                    _ => break,
                }
            }
        })
    }
}

#[async_trait]
impl Repository for LyricRepository {
    fn stream_all(&self) -> RecordBatchStream<'_> {
        let category = self.category_segment();
        self.paginate(endpoint(
            &self.config.common.base_url,
            &["data", "category", &category],
        ))
    }

    fn stream_by_organization<'a>(&'a self, organization: &'a str) -> RecordBatchStream<'a> {
        let category = self.category_segment();
        self.paginate(endpoint(
            &self.config.common.base_url,
            &["data", "category", &category, "organization", organization],
        ))
    }

    async fn get_record(&self, organization: &str, id: &str) -> Result<DataRecord, RepositoryError> {
        let category = self.category_segment();
        let url = endpoint(
            &self.config.common.base_url,
            &["data", "category", &category, "id", id],
        )?;
        let url = with_query(&url, &[("view", VIEW.to_string())]);

        let Some(record) = self.http.get_json(&url).await?.and_then(DataRecord::from_value) else {
            return Ok(DataRecord::new());
        };

        if record.get_str(OWNER_FIELD) != Some(organization) {
            debug!(id = %id, organization = %organization, "Record belongs to another organization");
            return Ok(DataRecord::new());
        }

        Ok(record.with_identity_from(IDENTITY_SOURCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::DEFAULT_TIMEOUT;
    use futures::StreamExt;
    use mockito::{Matcher, Server};
    use record_indexer_shared::RepositoryCommon;
    use serde_json::json;

    fn config(base_url: &str, pagination_size: Option<u32>) -> LyricRepositoryConfig {
        LyricRepositoryConfig {
            common: RepositoryCommon {
                code: "lyricRepo1".to_string(),
                name: "Lyric Repository".to_string(),
                base_url: base_url.to_string(),
                index_name: "index_1_1".to_string(),
                pagination_size,
                kafka_topic: None,
            },
            category_id: 123,
            valid_data_only: true,
        }
    }

    fn repository(base_url: &str, pagination_size: Option<u32>) -> LyricRepository {
        LyricRepository::new(
            config(base_url, pagination_size),
            HttpClient::new(DEFAULT_TIMEOUT).unwrap(),
        )
    }

    async fn collect(stream: RecordBatchStream<'_>) -> Vec<Result<Vec<DataRecord>, RepositoryError>> {
        stream.collect().await
    }

    fn page_body(ids: &[u32], current: u32, total: u32) -> String {
        let records: Vec<Value> = ids
            .iter()
            .map(|id| json!({"systemId": format!("SYS{id}"), "organization": "ACME", "data": {"n": id}}))
            .collect();
        json!({
            "records": records,
            "pagination": {"currentPage": current, "pageSize": 2, "totalPages": total, "totalRecords": 5}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_stream_all_paginates_until_total_pages() {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for (page, ids) in [(1, vec![1, 2]), (2, vec![3, 4]), (3, vec![5])] {
            let mock = server
                .mock("GET", Matcher::Regex(r"^/data/category/123($|\?)".to_string()))
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("view".into(), "compound".into()),
                    Matcher::UrlEncoded("pageSize".into(), "2".into()),
                    Matcher::UrlEncoded("page".into(), page.to_string()),
                ]))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(page_body(&ids, page, 3))
                .expect(1)
                .create_async()
                .await;
            mocks.push(mock);
        }

        let repo = repository(&server.url(), Some(2));
        let batches = collect(repo.stream_all()).await;

        assert_eq!(batches.len(), 3);
        let records: Vec<DataRecord> = batches.into_iter().flat_map(|b| b.unwrap()).collect();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].id(), Some("SYS1".to_string()));
        assert!(records[0].get("systemId").is_none());
        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_stream_all_unpaginated_makes_one_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/data/category/123($|\?)".to_string()))
            .match_query(Matcher::UrlEncoded("view".into(), "compound".into()))
            .with_status(200)
            .with_body(page_body(&[1, 2], 1, 3))
            .expect(1)
            .create_async()
            .await;

        let repo = repository(&server.url(), None);
        let batches = collect(repo.stream_all()).await;

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].as_ref().unwrap().len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stream_by_organization_uses_organization_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                Matcher::Regex(r"^/data/category/123/organization/ACME($|\?)".to_string()),
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(page_body(&[7], 1, 1))
            .expect(1)
            .create_async()
            .await;

        let repo = repository(&server.url(), Some(10));
        let batches = collect(repo.stream_by_organization("ACME")).await;

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].as_ref().unwrap()[0].id(), Some("SYS7".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_ends_stream() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let repo = repository(&server.url(), Some(100));
        let batches = collect(repo.stream_all()).await;

        assert!(batches.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_page_ends_stream() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(json!({"records": "nope"}).to_string())
            .create_async()
            .await;

        let repo = repository(&server.url(), Some(2));
        assert!(collect(repo.stream_all()).await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_yielded_once() {
        let repo = repository("http://127.0.0.1:1", Some(2));
        let batches = collect(repo.stream_all()).await;

        assert_eq!(batches.len(), 1);
        assert!(matches!(batches[0], Err(RepositoryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_invalid_data_is_dropped() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"records": [
                    {"systemId": "A", "isValid": true},
                    {"systemId": "B", "isValid": false},
                    {"systemId": "C"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let repo = repository(&server.url(), None);
        let batches = collect(repo.stream_all()).await;
        let ids: Vec<Option<String>> = batches[0].as_ref().unwrap().iter().map(DataRecord::id).collect();

        assert_eq!(ids, vec![Some("A".to_string()), Some("C".to_string())]);
    }

    #[tokio::test]
    async fn test_get_record_checks_ownership() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(r"^/data/category/123/id/42($|\?)".to_string()))
            .match_query(Matcher::UrlEncoded("view".into(), "compound".into()))
            .with_status(200)
            .with_body(json!({"systemId": "42", "organization": "ACME", "data": {}}).to_string())
            .expect(2)
            .create_async()
            .await;

        let repo = repository(&server.url(), None);

        let owned = repo.get_record("ACME", "42").await.unwrap();
        assert_eq!(owned.id(), Some("42".to_string()));

        let foreign = repo.get_record("OTHER", "42").await.unwrap();
        assert!(foreign.is_empty());
    }

    #[tokio::test]
    async fn test_get_record_not_found_is_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let repo = repository(&server.url(), None);
        assert!(repo.get_record("ACME", "missing").await.unwrap().is_empty());
    }
}
