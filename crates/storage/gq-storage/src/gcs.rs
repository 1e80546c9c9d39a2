//! Cloud Storage JSON API listing backend.
//!
//! Speaks `GET <base>/b/<bucket>/o` with `prefix`, `delimiter`,
//! `pageToken` and `maxResults` query parameters, decoding the standard
//! `{items, prefixes, nextPageToken}` payload. Only public buckets are
//! reachable; authentication is the transport's concern, not ours.

use async_trait::async_trait;
use gq_error::{GqError, Result};
use serde::Deserialize;
use tracing::debug;

use crate::backend::{ListPage, ListRequest, ListingBackend, ObjectEntry};

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/storage/v1";

/// How much of an error body to carry into the error message.
const ERROR_BODY_LIMIT: usize = 1024;

/// Listing backend over the Cloud Storage JSON API.
#[derive(Debug, Clone)]
pub struct GcsBackend {
    http: reqwest::Client,
    base_url: String,
}

/// Wire shape of the `objects.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiListResponse {
    #[serde(default)]
    items: Vec<ApiObject>,
    #[serde(default)]
    prefixes: Vec<String>,
    next_page_token: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i32,
    message: String,
}

impl GcsBackend {
    /// Create a backend using the public Cloud Storage endpoint.
    ///
    /// The supplied client carries timeout and TLS configuration.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the backend at a different endpoint (test servers,
    /// emulators).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ListingBackend for GcsBackend {
    async fn list(&self, request: ListRequest) -> Result<ListPage> {
        if request.bucket.is_empty() {
            return Err(GqError::Backend("bucket is required".to_string()));
        }

        let endpoint = format!("{}/b/{}/o", self.base_url, request.bucket);
        let mut url = reqwest::Url::parse(&endpoint)
            .map_err(|e| GqError::Backend(format!("invalid listing endpoint: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            if !request.prefix.is_empty() {
                query.append_pair("prefix", &request.prefix);
            }
            if !request.delimiter.is_empty() {
                query.append_pair("delimiter", &request.delimiter);
            }
            if let Some(token) = &request.page_token {
                query.append_pair("pageToken", token);
            }
            if request.page_size > 0 {
                query.append_pair("maxResults", &request.page_size.to_string());
            }
        }

        debug!(
            bucket = %request.bucket,
            prefix = %request.prefix,
            delimiter = %request.delimiter,
            page_size = request.page_size,
            "listing objects"
        );

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GqError::Backend(format!("listing request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(GqError::Backend(format!(
                "storage api error: status={status} body={snippet}"
            )));
        }

        let payload: ApiListResponse = response
            .json()
            .await
            .map_err(|e| GqError::Backend(format!("invalid storage api response: {e}")))?;

        if let Some(error) = payload.error {
            return Err(GqError::Backend(format!(
                "storage api error: code={} msg={}",
                error.code, error.message
            )));
        }

        Ok(ListPage {
            objects: payload
                .items
                .into_iter()
                .map(|item| ObjectEntry { name: item.name })
                .collect(),
            prefixes: payload.prefixes,
            next_page_token: payload.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> GcsBackend {
        GcsBackend::new(reqwest::Client::new()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_list_decodes_objects_and_prefixes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/photos/o"))
            .and(query_param("prefix", "raw/"))
            .and(query_param("delimiter", "/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "raw/index.txt"}],
                "prefixes": ["raw/alps/", "raw/coast/"],
                "nextPageToken": "tok-2"
            })))
            .mount(&server)
            .await;

        let page = backend_for(&server)
            .list(
                ListRequest::new("photos")
                    .with_prefix("raw/")
                    .with_delimiter("/"),
            )
            .await
            .unwrap();

        assert_eq!(page.objects, vec![ObjectEntry { name: "raw/index.txt".to_string() }]);
        assert_eq!(page.prefixes, vec!["raw/alps/", "raw/coast/"]);
        assert_eq!(page.next_page_token, Some("tok-2".to_string()));
    }

    #[tokio::test]
    async fn test_list_sends_token_and_max_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/photos/o"))
            .and(query_param("pageToken", "tok-2"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [],
                "prefixes": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = backend_for(&server)
            .list(
                ListRequest::new("photos")
                    .with_page_token("tok-2")
                    .with_page_size(50),
            )
            .await
            .unwrap();

        assert!(page.objects.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_non_2xx_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("access denied"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .list(ListRequest::new("locked"))
            .await
            .unwrap_err();

        assert!(!err.is_client_error());
        assert!(err.to_string().contains("status=403"));
        assert!(err.to_string().contains("access denied"));
    }

    #[tokio::test]
    async fn test_embedded_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 429, "message": "slow down"}
            })))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .list(ListRequest::new("busy"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("code=429"));
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .list(ListRequest::new("bucket"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid storage api response"));
    }

    #[tokio::test]
    async fn test_empty_bucket_rejected() {
        let server = MockServer::start().await;
        let err = backend_for(&server)
            .list(ListRequest::new(""))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bucket is required"));
    }
}
