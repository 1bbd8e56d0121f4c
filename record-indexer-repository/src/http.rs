//! JSON-over-HTTP access shared by the repository variants.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::errors::RepositoryError;

/// Default timeout for upstream requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Thin wrapper over a shared `reqwest::Client`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client sending and accepting JSON, with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Value))` - A successful response with a JSON body
    /// * `Ok(None)` - A non-success status or a body that is not JSON
    /// * `Err(RepositoryError::Transport)` - If the request failed on the wire
    pub async fn get_json(&self, url: &Url) -> Result<Option<Value>, RepositoryError> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Upstream returned non-success status");
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(url = %url, error = %e, "Upstream returned a body that is not JSON");
                Ok(None)
            }
        }
    }
}

/// Join path segments onto a base URL, percent-encoding each segment.
pub fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, RepositoryError> {
    let mut url =
        Url::parse(base_url).map_err(|e| RepositoryError::invalid_url(format!("{base_url}: {e}")))?;

    url.path_segments_mut()
        .map_err(|_| RepositoryError::invalid_url(format!("{base_url}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Return `url` with the given query pairs appended.
pub fn with_query(url: &Url, pairs: &[(&str, String)]) -> Url {
    let mut url = url.clone();
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_endpoint_joins_segments() {
        let url = endpoint("http://lyric:3030", &["data", "category", "1"]).unwrap();
        assert_eq!(url.as_str(), "http://lyric:3030/data/category/1");

        let url = endpoint("http://lyric:3030/api/", &["data", "category", "1"]).unwrap();
        assert_eq!(url.as_str(), "http://lyric:3030/api/data/category/1");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("http://song", &["studies", "A/B", "analysis"]).unwrap();
        assert_eq!(url.as_str(), "http://song/studies/A%2FB/analysis");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        assert!(matches!(
            endpoint("not a url", &["x"]),
            Err(RepositoryError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_with_query() {
        let base = endpoint("http://lyric", &["data"]).unwrap();

        let url = with_query(&base, &[("view", "compound".to_string()), ("page", "2".to_string())]);
        assert_eq!(url.as_str(), "http://lyric/data?view=compound&page=2");

        assert_eq!(with_query(&base, &[]).as_str(), "http://lyric/data");
    }

    #[tokio::test]
    async fn test_get_json_non_success_is_none() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(DEFAULT_TIMEOUT).unwrap();
        let url = endpoint(&server.url(), &["missing"]).unwrap();

        assert!(client.get_json(&url).await.unwrap().is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_invalid_body_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/text")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = HttpClient::new(DEFAULT_TIMEOUT).unwrap();
        let url = endpoint(&server.url(), &["text"]).unwrap();

        assert!(client.get_json(&url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_json_transport_error() {
        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse("http://127.0.0.1:1/unreachable").unwrap();

        assert!(matches!(
            client.get_json(&url).await,
            Err(RepositoryError::Transport(_))
        ));
    }
}
