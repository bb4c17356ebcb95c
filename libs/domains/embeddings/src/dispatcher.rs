//! Routes each inbound event to its operation and builds the reply.
//!
//! Every event ends in exactly one of: a success reply, an `"error"` reply for
//! unsupported operations, or a [`Rejection`] the transport turns into 400/500.

use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use std::sync::Arc;
use thiserror::Error;
use tracing::{Span, error, info, instrument, warn};

use crate::error::EmbeddingError;
use crate::events::{CloudEvent, Operation, ReplyType};
use crate::mapper;
use crate::models::{Record, ReplyBody};
use crate::repository::RecordStore;

pub const UNSUPPORTED_OPERATION: &str = "Error, no supported event type given";
pub const INSERT_FAILED: &str = "error while inserting data in database";
pub const RECORD_NOT_FOUND: &str = "id not found in store";
pub const ENCODE_FAILED: &str = "failed to set response data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    ClientError,
    ServerError,
}

/// An event the dispatcher refused to answer with a reply event.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Rejection {
    pub class: StatusClass,
    pub message: String,
    #[source]
    pub cause: EmbeddingError,
}

impl Rejection {
    fn client(message: impl Into<String>, cause: EmbeddingError) -> Self {
        warn!(kind = cause.kind(), error = %cause, "Event rejected");
        Self {
            class: StatusClass::ClientError,
            message: message.into(),
            cause,
        }
    }

    fn server(message: impl Into<String>, cause: EmbeddingError) -> Self {
        error!(kind = cause.kind(), error = %cause, "Event failed");
        Self {
            class: StatusClass::ServerError,
            message: message.into(),
            cause,
        }
    }

    /// Code reported to the caller. A lookup that failed in the backend is
    /// reported exactly like a missing record.
    pub fn error_code(&self) -> ErrorCode {
        match (&self.class, &self.cause) {
            (StatusClass::ClientError, EmbeddingError::Store(_)) => ErrorCode::NotFound,
            (_, cause) => cause.error_code(),
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        let code = rejection.error_code();
        match rejection.class {
            StatusClass::ClientError => AppError::bad_request(code, rejection.message),
            StatusClass::ServerError => AppError::internal(code, rejection.message),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Event dispatcher over a shared record store.
pub struct Dispatcher<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore> Dispatcher<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(
        skip_all,
        fields(
            event_id = %event.id,
            event_type = %event.event_type,
            record_id = tracing::field::Empty,
        )
    )]
    pub async fn dispatch(&self, event: &CloudEvent) -> Result<CloudEvent, Rejection> {
        match event.operation() {
            Operation::Insert => self.process_insert(event).await,
            Operation::Get => self.process_get(event).await,
            Operation::Unknown => unsupported(),
        }
    }

    async fn process_insert(&self, event: &CloudEvent) -> Result<CloudEvent, Rejection> {
        let req = mapper::decode_insert_request(&event.data)
            .map_err(|e| Rejection::client(e.to_string(), e))?;
        Span::current().record("record_id", req.id.as_str());

        mapper::validate_insert(&req).map_err(|e| Rejection::client(e.to_string(), e))?;

        let record = Record::from(req);
        self.store
            .put(&record.id, &record.embeddings)
            .await
            .map_err(|e| Rejection::server(INSERT_FAILED, e))?;
        info!(record_id = %record.id, "Record inserted");

        reply(ReplyType::Inserter, &ReplyBody::success())
    }

    async fn process_get(&self, event: &CloudEvent) -> Result<CloudEvent, Rejection> {
        let req = mapper::decode_get_request(&event.data)
            .map_err(|e| Rejection::client(e.to_string(), e))?;
        Span::current().record("record_id", req.id.as_str());

        mapper::validate_get(&req).map_err(|e| Rejection::client(e.to_string(), e))?;

        let embeddings = self
            .store
            .get(&req.id)
            .await
            .map_err(|e| Rejection::client(RECORD_NOT_FOUND, e))?;
        info!(record_id = %req.id, "Record fetched");

        reply(ReplyType::Inserter, &ReplyBody::with_embeddings(embeddings))
    }
}

fn unsupported() -> Result<CloudEvent, Rejection> {
    let data = mapper::encode_error(UNSUPPORTED_OPERATION)
        .map_err(|e| Rejection::server(ENCODE_FAILED, e))?;
    info!("Unsupported event type, replying with error event");
    Ok(CloudEvent::reply(ReplyType::Error, data))
}

fn reply(reply_type: ReplyType, body: &ReplyBody) -> Result<CloudEvent, Rejection> {
    let data = mapper::encode_response(body).map_err(|e| Rejection::server(ENCODE_FAILED, e))?;
    Ok(CloudEvent::reply(reply_type, data))
}
