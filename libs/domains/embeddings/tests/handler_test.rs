//! Handler tests for the CloudEvents HTTP binding
//!
//! These drive the receiver router with `oneshot` and check status codes,
//! reply headers and JSON bodies.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ErrorResponse;
use domain_embeddings::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app(store: InMemoryRecordStore) -> axum::Router {
    handlers::router(Dispatcher::new(store))
}

fn binary_event(event_type: &str, data: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("ce-specversion", "1.0")
        .header("ce-type", event_type)
        .header("ce-source", "face-extractor")
        .header("ce-id", "evt-1")
        .header("content-type", "application/json")
        .body(Body::from(data.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_insert_returns_binary_reply() {
    let store = InMemoryRecordStore::provisioned();

    let response = app(store.clone())
        .oneshot(binary_event(
            "insert",
            json!({"id": "a@example.com", "embeddings": "xyz"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["ce-type"], "inserter");
    assert_eq!(response.headers()["ce-source"], "data-controller");
    assert_eq!(response.headers()["ce-specversion"], "1.0");
    assert_eq!(response.headers()["content-type"], "application/json");

    let body: ReplyBody = json_body(response.into_body()).await;
    assert_eq!(body, ReplyBody::success());
    assert_eq!(store.get("a@example.com").await.unwrap(), "xyz");
}

#[tokio::test]
async fn test_get_returns_payload() {
    let store = InMemoryRecordStore::provisioned();
    store.put("a@example.com", "xyz").await.unwrap();

    let response = app(store)
        .oneshot(binary_event("get", json!({"id": "a@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ReplyBody = json_body(response.into_body()).await;
    assert_eq!(body.embeddings.as_deref(), Some("xyz"));
}

#[tokio::test]
async fn test_get_missing_returns_400() {
    let response = app(InMemoryRecordStore::provisioned())
        .oneshot(binary_event("get", json!({"id": "missing@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.error, "NOT_FOUND");
}

#[tokio::test]
async fn test_insert_validation_failure_returns_400() {
    let response = app(InMemoryRecordStore::provisioned())
        .oneshot(binary_event("insert", json!({"id": "a@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.error, "VALIDATION_ERROR");
    assert_eq!(body.message, "id or embeddings cannot be empty");
}

#[tokio::test]
async fn test_insert_store_failure_returns_500() {
    // Schema never provisioned: every write fails in the store
    let response = app(InMemoryRecordStore::new())
        .oneshot(binary_event(
            "insert",
            json!({"id": "a@example.com", "embeddings": "xyz"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.error, "STORE_ERROR");
    assert_eq!(body.message, "error while inserting data in database");
}

#[tokio::test]
async fn test_unknown_type_returns_error_event() {
    let response = app(InMemoryRecordStore::provisioned())
        .oneshot(binary_event("delete", json!({"id": "a@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["ce-type"], "error");
    let body: ReplyBody = json_body(response.into_body()).await;
    assert_eq!(body.message, "Error, no supported event type given");
}

#[tokio::test]
async fn test_missing_ce_headers_returns_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"id":"a@example.com"}"#))
        .unwrap();

    let response = app(InMemoryRecordStore::provisioned())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.error, "INVALID_EVENT");
}

#[tokio::test]
async fn test_structured_mode_insert() {
    let store = InMemoryRecordStore::provisioned();
    let envelope = json!({
        "specversion": "1.0",
        "type": "insert",
        "source": "face-extractor",
        "id": "evt-2",
        "datacontenttype": "application/json",
        "data": {"id": "s@example.com", "embeddings": "abc"}
    });
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/cloudevents+json")
        .body(Body::from(envelope.to_string()))
        .unwrap();

    let response = app(store.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.get("s@example.com").await.unwrap(), "abc");
}

#[tokio::test]
async fn test_ready_reports_store() {
    let response = app(InMemoryRecordStore::provisioned())
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: axum_helpers::ReadyResponse = json_body(response.into_body()).await;
    assert_eq!(body.checks["cassandra"], "connected");
}
