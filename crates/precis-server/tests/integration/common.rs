use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use precis_core::IngestService;
use precis_core::testutil::{MockFetcher, MockStore, MockSummarizer};
use precis_server::routes;
use precis_server::state::AppState;

/// Router wired to mocks, plus handles for asserting on calls.
pub struct TestApp {
    pub router: Router,
    pub store: MockStore,
    pub fetcher: MockFetcher,
    pub summarizer: MockSummarizer,
}

/// App whose fetcher returns "Hello world" and whose summarizer uppercases.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(
        MockStore::empty(),
        MockFetcher::new("Hello world"),
        MockSummarizer::uppercase(),
    )
}

pub fn setup_test_app_with(
    store: MockStore,
    fetcher: MockFetcher,
    summarizer: MockSummarizer,
) -> TestApp {
    setup_test_app_with_timeout(store, fetcher, summarizer, Duration::from_secs(10))
}

pub fn setup_test_app_with_timeout(
    store: MockStore,
    fetcher: MockFetcher,
    summarizer: MockSummarizer,
    request_timeout: Duration,
) -> TestApp {
    let service = IngestService::new(store.clone(), fetcher.clone(), summarizer.clone());
    let state = Arc::new(AppState::new(service).with_request_timeout(request_timeout));

    TestApp {
        router: routes::app(state),
        store,
        fetcher,
        summarizer,
    }
}

pub fn post_json(path: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

/// Send a request and decode the JSON response body.
pub async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}
