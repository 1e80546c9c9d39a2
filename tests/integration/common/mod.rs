//! Shared helpers for driving the router in tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use gq_api::{build_router, ServerConfig};
use gq_query::{QueryConfig, QueryExecutor};
use gq_storage::MemoryBackend;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// The fixture bucket: two class directories of images plus one stray
/// text file.
pub fn sample_objects() -> Vec<&'static str> {
    vec![
        "root/a/cls1_01.jpg",
        "root/a/cls1_02.jpg",
        "root/b/cls2_01.jpg",
        "root/b/cls2_02.jpg",
        "root/b/other.txt",
    ]
}

/// A router over the sample objects with page-size bounds loose enough
/// for small test pages.
pub fn sample_router() -> Router {
    router_over(sample_objects())
}

pub fn router_over<I, S>(names: I) -> Router
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let backend = Arc::new(MemoryBackend::new(names));
    let config = ServerConfig::default();
    let query_config = QueryConfig::new()
        .with_page_size_bounds(1, 500)
        .with_default_page_size(100);
    let executor = Arc::new(QueryExecutor::new(backend, query_config));
    build_router(executor, &config)
}

/// POST a JSON value to a route and return (status, body).
pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    split(response).await
}

/// GET a route and return (status, body).
pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    split(response).await
}

async fn split(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
