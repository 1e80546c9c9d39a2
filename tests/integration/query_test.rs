//! Query endpoint scenarios: full pages, cursor chaining, dialects,
//! and client-error mapping.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{get_json, post_json, router_over, sample_router};

fn item_names(body: &Value) -> Vec<String> {
    let mut names: Vec<String> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["object"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = sample_router();
    let (status, body) = get_json(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_percent_pattern_returns_all_matches() {
    let router = sample_router();
    let (status, body) = post_json(
        &router,
        "/api/query",
        json!({
            "pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg",
            "mode": "percent",
            "pageSize": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["captureNames"], json!(["dir", "cls", "idx"]));
    assert_eq!(body["stats"]["matched"], 4);
    assert!(body.get("nextCursor").is_none());
    assert_eq!(
        item_names(&body),
        vec![
            "root/a/cls1_01.jpg",
            "root/a/cls1_02.jpg",
            "root/b/cls2_01.jpg",
            "root/b/cls2_02.jpg",
        ]
    );

    let first = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["object"] == "root/a/cls1_01.jpg")
        .unwrap();
    assert_eq!(
        first["captures"],
        json!({"dir": "a", "cls": "cls1", "idx": "01"})
    );
}

#[tokio::test]
async fn test_small_pages_chain_through_the_cursor() {
    let router = sample_router();
    let mut request = json!({
        "pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg",
        "pageSize": 2
    });

    let mut collected: Vec<String> = Vec::new();
    let mut last_matched = 0;
    let mut rounds = 0;

    loop {
        let (status, body) = post_json(&router, "/api/query", request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["items"].as_array().unwrap().len() <= 2);
        collected.extend(item_names(&body));

        let matched = body["stats"]["matched"].as_u64().unwrap();
        assert!(matched >= last_matched, "stats must be monotonic");
        last_matched = matched;

        rounds += 1;
        assert!(rounds < 20, "cursor chain must terminate");

        match body.get("nextCursor") {
            Some(cursor) => request["cursor"] = cursor.clone(),
            None => break,
        }
    }

    collected.sort();
    collected.dedup();
    assert_eq!(collected.len(), 4, "every match exactly once");
    assert_eq!(last_matched, 4);
}

#[tokio::test]
async fn test_regex_mode_finds_the_same_matches() {
    let router = sample_router();
    let (status, body) = post_json(
        &router,
        "/api/query",
        json!({
            "pattern": r"gs://B/root/(?<dir>[a-z])/(?<cls>cls\d)_(?<idx>\d{2})\.jpg",
            "mode": "regex"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 4);
    assert_eq!(body["captureNames"], json!(["dir", "cls", "idx"]));
    assert_eq!(body["stats"]["matched"], 4);
}

#[tokio::test]
async fn test_pattern_without_matches_returns_empty_page() {
    let router = sample_router();
    let (status, body) = post_json(
        &router,
        "/api/query",
        json!({"pattern": "gs://B/root/%dir%/missing_%idx%.jpg"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert!(body.get("nextCursor").is_none());
    assert_eq!(body["stats"]["matched"], 0);
}

#[tokio::test]
async fn test_malformed_pattern_is_client_error() {
    let router = sample_router();
    let (status, body) =
        post_json(&router, "/api/query", json!({"pattern": "bucket/foo"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("gs://"));
}

#[tokio::test]
async fn test_cursor_rebound_to_other_pattern_is_client_error() {
    let router = sample_router();
    let (status, first) = post_json(
        &router,
        "/api/query",
        json!({"pattern": "gs://B/root/%dir%/%cls%_%idx%.jpg", "pageSize": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cursor = first["nextCursor"].as_str().unwrap();

    let (status, body) = post_json(
        &router,
        "/api/query",
        json!({
            "pattern": "gs://B/root/%dir%/%cls%_%n%.png",
            "pageSize": 2,
            "cursor": cursor
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cursor does not match current pattern");
}

#[tokio::test]
async fn test_empty_bucket_yields_empty_page() {
    let router = router_over(Vec::<String>::new());
    let (status, body) = post_json(
        &router,
        "/api/query",
        json!({"pattern": "gs://B/root/%dir%/x_%i%.jpg"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["stats"], json!({
        "scannedPrefixes": 0,
        "scannedObjects": 0,
        "matched": 0
    }));
}

#[tokio::test]
async fn test_prefix_prune_soundness() {
    // Objects outside the literal prefix are never scanned.
    let router = router_over([
        "root/a/img_1.jpg",
        "elsewhere/a/img_2.jpg",
        "zzz/top.jpg",
    ]);
    let (status, body) = post_json(
        &router,
        "/api/query",
        json!({"pattern": "gs://B/root/%dir%/img_%i%.jpg"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), vec!["root/a/img_1.jpg"]);
    assert_eq!(body["stats"]["scannedObjects"], 1);
}
