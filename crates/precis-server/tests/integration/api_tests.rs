use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use precis_core::testutil::{MockFetcher, MockStore, MockSummarizer};
use precis_server::routes::WELCOME_MESSAGE;

use crate::integration::common::{
    get, post_json, send_json, setup_test_app, setup_test_app_with, setup_test_app_with_timeout,
};

#[tokio::test]
async fn root_returns_welcome_text() {
    let app = setup_test_app();

    let response = app.router.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, WELCOME_MESSAGE.as_bytes());
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_url_returns_record_and_summary() {
    let app = setup_test_app();

    let (status, json) = send_json(
        app.router,
        post_json(
            "/api/submit-url",
            &serde_json::json!({"url": "http://example.com"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["message"].is_string());
    assert_eq!(json["summary"], "HELLO WORLD");
    assert_eq!(json["data"]["url"], "http://example.com");
    assert!(json["data"]["createdAt"].is_string());

    let id: Uuid = json["data"]["id"].as_str().unwrap().parse().unwrap();
    let stored = app.store.records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(app.fetcher.requested_urls(), vec!["http://example.com"]);
}

#[tokio::test]
async fn submit_url_without_url_returns_400() {
    for body in [
        serde_json::json!({}),
        serde_json::json!({"url": null}),
        serde_json::json!({"url": ""}),
    ] {
        let app = setup_test_app();

        let (status, json) = send_json(app.router, post_json("/api/submit-url", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["code"], "validation_error");
        assert!(json["error"].is_string());
        assert!(app.store.is_empty());
        assert_eq!(app.fetcher.call_count(), 0);
    }
}

#[tokio::test]
async fn submit_url_with_malformed_body_returns_400() {
    let app = setup_test_app();

    let request = Request::post("/api/submit-url")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn submit_url_fetch_failure_returns_500_and_keeps_record() {
    let app = setup_test_app_with(
        MockStore::empty(),
        MockFetcher::failing("connection refused"),
        MockSummarizer::uppercase(),
    );

    let (status, json) = send_json(
        app.router,
        post_json(
            "/api/submit-url",
            &serde_json::json!({"url": "http://unreachable.example"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "fetch_error");
    assert_eq!(json["error"], "Failed to fetch website content");
    assert!(json.get("summary").is_none());
    assert_eq!(app.store.len(), 1);
    assert_eq!(app.summarizer.call_count(), 0);
}

#[tokio::test]
async fn submit_url_summarization_failure_returns_500() {
    let app = setup_test_app_with(
        MockStore::empty(),
        MockFetcher::new("Hello world"),
        MockSummarizer::failing("Incorrect API key provided", 401),
    );

    let (status, json) = send_json(
        app.router,
        post_json(
            "/api/submit-url",
            &serde_json::json!({"url": "http://example.com"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "summarization_error");
    assert!(!json["error"].as_str().unwrap().contains("API key"));
}

#[tokio::test]
async fn submit_url_storage_failure_returns_500() {
    let app = setup_test_app_with(
        MockStore::with_write_error("disk full"),
        MockFetcher::new("Hello world"),
        MockSummarizer::uppercase(),
    );

    let (status, json) = send_json(
        app.router,
        post_json(
            "/api/submit-url",
            &serde_json::json!({"url": "http://example.com"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "database_error");
    assert_eq!(app.fetcher.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Get summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_summary_resummarizes_stored_url() {
    let app = setup_test_app();
    let record = app.store.insert("http://example.com/about");

    let (status, json) = send_json(
        app.router,
        get(&format!("/api/get-summary/{}", record.id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());
    assert_eq!(json["summary"], "HELLO WORLD");
    assert_eq!(
        app.fetcher.requested_urls(),
        vec!["http://example.com/about"]
    );
}

#[tokio::test]
async fn get_summary_unknown_id_returns_404() {
    let app = setup_test_app();

    let (status, json) = send_json(
        app.router,
        get(&format!("/api/get-summary/{}", Uuid::new_v4())),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
    assert_eq!(app.fetcher.call_count(), 0);
}

#[tokio::test]
async fn get_summary_malformed_id_returns_404() {
    let app = setup_test_app();

    let (status, json) = send_json(app.router, get("/api/get-summary/not-an-id")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn get_summary_fetch_failure_returns_500() {
    let store = MockStore::empty();
    let record = store.insert("http://gone.example");
    let app = setup_test_app_with(
        store,
        MockFetcher::failing("HTTP 410"),
        MockSummarizer::uppercase(),
    );

    let (status, json) = send_json(
        app.router,
        get(&format!("/api/get-summary/{}", record.id)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "fetch_error");
}

#[tokio::test]
async fn concurrent_get_summary_calls_are_independent() {
    let app = setup_test_app();
    let record = app.store.insert("http://example.com");
    let path = format!("/api/get-summary/{}", record.id);

    let (a, b) = tokio::join!(
        send_json(app.router.clone(), get(&path)),
        send_json(app.router.clone(), get(&path)),
    );

    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(a.1["summary"], b.1["summary"]);
    assert_eq!(app.fetcher.call_count(), 2);
    assert_eq!(app.summarizer.call_count(), 2);
}

#[tokio::test]
async fn summaries_are_not_cached_between_calls() {
    let app = setup_test_app_with(
        MockStore::empty(),
        MockFetcher::new("Hello world"),
        MockSummarizer::numbered(),
    );

    let (_, submitted) = send_json(
        app.router.clone(),
        post_json(
            "/api/submit-url",
            &serde_json::json!({"url": "http://example.com"}),
        ),
    )
    .await;
    let id = submitted["data"]["id"].as_str().unwrap();

    let (_, fetched) = send_json(app.router, get(&format!("/api/get-summary/{id}"))).await;

    assert_eq!(submitted["summary"], "summary #1");
    assert_eq!(fetched["summary"], "summary #2");
}

#[tokio::test]
async fn slow_request_times_out_with_json_error() {
    let app = setup_test_app_with_timeout(
        MockStore::empty(),
        MockFetcher::new("Hello world").with_delay(Duration::from_secs(5)),
        MockSummarizer::uppercase(),
        Duration::from_millis(100),
    );

    let (status, json) = send_json(
        app.router,
        post_json(
            "/api/submit-url",
            &serde_json::json!({"url": "http://slow.example"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "timeout");
    assert_eq!(json["error"], "Request timed out");
    assert_eq!(app.store.len(), 1);
    assert_eq!(app.summarizer.call_count(), 0);
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app();

    let (status, json) = send_json(app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn health_reports_unreachable_store() {
    let app = setup_test_app_with(
        MockStore::unhealthy(),
        MockFetcher::new("x"),
        MockSummarizer::uppercase(),
    );

    let (status, json) = send_json(app.router, get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"], "error");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app();

    let (status, json) = send_json(app.router, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/submit-url"].is_object());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(
            Request::get("/")
                .header("origin", "https://frontend.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
