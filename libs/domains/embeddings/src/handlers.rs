use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::{get, post},
};
use axum_helpers::{AppError, ErrorResponse, HealthCheckFuture, ReadyResponse, run_health_checks};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::dispatcher::Dispatcher;
use crate::events::CloudEvent;
use crate::models::{GetRequest, InsertRequest, ReplyBody};
use crate::repository::RecordStore;

const TAG: &str = "events";

/// OpenAPI documentation for the event receiver
#[derive(OpenApi)]
#[openapi(
    paths(receive, ready),
    components(schemas(InsertRequest, GetRequest, ReplyBody, ErrorResponse, ReadyResponse)),
    tags(
        (name = TAG, description = "CloudEvents receiver for embeddings records")
    )
)]
pub struct ApiDoc;

/// Create the receiver router: `POST /` for events, `GET /ready` for readiness
pub fn router<S: RecordStore + 'static>(dispatcher: Dispatcher<S>) -> Router {
    let shared = Arc::new(dispatcher);

    Router::new()
        .route("/", post(receive))
        .route("/ready", get(ready))
        .with_state(shared)
}

/// Receive a CloudEvent and reply with a CloudEvent
///
/// Binary mode (`ce-*` headers) and structured mode
/// (`application/cloudevents+json`) are accepted. The reply is binary mode.
#[utoipa::path(
    post,
    path = "/",
    tag = TAG,
    params(
        ("ce-specversion" = String, Header, description = "Must be 1.0"),
        ("ce-type" = String, Header, description = "insert | get"),
        ("ce-source" = String, Header, description = "Producer of the event"),
        ("ce-id" = String, Header, description = "Event id"),
    ),
    request_body(
        content = InsertRequest,
        description = "Event data: {id, embeddings} for insert, {id} for get",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Reply event; ce-type is inserter or error", body = ReplyBody),
        (status = 400, description = "Malformed event, invalid data or unknown id", body = ErrorResponse),
        (status = 500, description = "Store or encoding failure", body = ErrorResponse)
    )
)]
async fn receive<S: RecordStore>(
    State(dispatcher): State<Arc<Dispatcher<S>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<CloudEvent, AppError> {
    let event = CloudEvent::from_http(&headers, body)?;
    let reply = dispatcher.dispatch(&event).await?;
    Ok(reply)
}

/// Readiness: 200 when the store answers, 503 otherwise
#[utoipa::path(
    get,
    path = "/ready",
    tag = TAG,
    responses(
        (status = 200, description = "Store reachable", body = ReadyResponse),
        (status = 503, description = "Store unreachable", body = ReadyResponse)
    )
)]
async fn ready<S: RecordStore>(State(dispatcher): State<Arc<Dispatcher<S>>>) -> Response {
    let store = dispatcher.store();
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "cassandra",
        Box::pin(async move { store.health_check().await.map_err(|e| e.to_string()) }),
    )];
    run_health_checks(checks).await
}
