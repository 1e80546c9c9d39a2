//! Count endpoint scenarios.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{post_json, router_over, sample_router};

#[tokio::test]
async fn test_count_matches_query_total() {
    let router = sample_router();
    let (status, body) = post_json(
        &router,
        "/api/count",
        json!({"pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["stats"]["matched"], 4);
}

#[tokio::test]
async fn test_count_after_partial_walk_covers_the_whole_walk() {
    let router = sample_router();
    let (_, first) = post_json(
        &router,
        "/api/count",
        json!({"pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg"}),
    )
    .await;
    let total = first["total"].as_u64().unwrap();

    // Resume counting from a mid-walk cursor; the total is unchanged
    // because cursor stats carry the matches already emitted.
    let (_, page) = post_json(
        &router,
        "/api/query",
        json!({"pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg", "pageSize": 2}),
    )
    .await;
    let cursor = page["nextCursor"].as_str().unwrap();

    let (status, resumed) = post_json(
        &router,
        "/api/count",
        json!({
            "pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg",
            "cursor": cursor
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["total"].as_u64().unwrap(), total);
}

#[tokio::test]
async fn test_count_of_unmatched_pattern_is_zero() {
    let router = router_over(["root/readme.md"]);
    let (status, body) = post_json(
        &router,
        "/api/count",
        json!({"pattern": "gs://B/root/%n%.jpg"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["stats"]["scannedObjects"], 1);
}
