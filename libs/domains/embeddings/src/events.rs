//! CloudEvents 1.0 envelope and its HTTP protocol binding.
//!
//! Inbound events are accepted in binary mode (attributes in `ce-*` headers,
//! data in the body) or structured mode (`application/cloudevents+json`).
//! Replies are always written in binary mode.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

pub const SPEC_VERSION: &str = "1.0";
pub const SERVICE_SOURCE: &str = "data-controller";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

const CE_SPECVERSION: &str = "ce-specversion";
const CE_TYPE: &str = "ce-type";
const CE_SOURCE: &str = "ce-source";
const CE_ID: &str = "ce-id";
const CE_TIME: &str = "ce-time";

/// Operation an inbound event asks for, resolved once from its `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Get,
    Unknown,
}

impl From<&str> for Operation {
    fn from(event_type: &str) -> Self {
        match event_type {
            "insert" => Operation::Insert,
            "get" => Operation::Get,
            _ => Operation::Unknown,
        }
    }
}

/// `type` attribute of a reply event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyType {
    Inserter,
    Error,
}

impl ReplyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyType::Inserter => "inserter",
            ReplyType::Error => "error",
        }
    }
}

/// Envelope problems detected before dispatch. Always a 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("missing required event attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error("unsupported specversion '{0}', expected 1.0")]
    UnsupportedVersion(String),

    #[error("malformed event: {0}")]
    Malformed(String),
}

impl From<EnvelopeError> for AppError {
    fn from(err: EnvelopeError) -> Self {
        AppError::bad_request(ErrorCode::InvalidEvent, err.to_string())
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudEvent {
    pub specversion: String,
    pub event_type: String,
    pub source: String,
    pub id: String,
    pub time: Option<DateTime<Utc>>,
    pub datacontenttype: Option<String>,
    /// Raw data; decoding is up to the operation handler
    pub data: Bytes,
}

impl CloudEvent {
    /// New 1.0 event with a UUIDv7 id, the current time and JSON data.
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            specversion: SPEC_VERSION.to_string(),
            event_type: event_type.into(),
            source: source.into(),
            id: Uuid::now_v7().to_string(),
            time: Some(Utc::now()),
            datacontenttype: Some(JSON_CONTENT_TYPE.to_string()),
            data: data.into(),
        }
    }

    /// Reply event emitted by this service.
    pub fn reply(reply_type: ReplyType, data: impl Into<Bytes>) -> Self {
        Self::new(reply_type.as_str(), SERVICE_SOURCE, data)
    }

    pub fn operation(&self) -> Operation {
        Operation::from(self.event_type.as_str())
    }

    /// Read an event from an HTTP request in either content mode.
    pub fn from_http(headers: &HeaderMap, body: Bytes) -> Result<Self, EnvelopeError> {
        let content_type = header_value(headers, "content-type")?;

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(STRUCTURED_CONTENT_TYPE))
        {
            return Self::from_structured(&body);
        }

        let specversion = required_header(headers, CE_SPECVERSION)?;
        check_version(&specversion)?;

        let time = header_value(headers, CE_TIME)?
            .map(|raw| parse_time(&raw))
            .transpose()?;

        Ok(Self {
            specversion,
            event_type: required_header(headers, CE_TYPE)?,
            source: required_header(headers, CE_SOURCE)?,
            id: required_header(headers, CE_ID)?,
            time,
            datacontenttype: content_type,
            data: body,
        })
    }

    fn from_structured(body: &[u8]) -> Result<Self, EnvelopeError> {
        let envelope: StructuredEnvelope =
            serde_json::from_slice(body).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;

        let specversion = envelope
            .specversion
            .ok_or(EnvelopeError::MissingAttribute("specversion"))?;
        check_version(&specversion)?;

        let data = match envelope.data {
            None => Bytes::new(),
            // Some producers send JSON data pre-serialized as a string
            Some(serde_json::Value::String(raw)) => Bytes::from(raw),
            Some(value) => serde_json::to_vec(&value)
                .map(Bytes::from)
                .map_err(|e| EnvelopeError::Malformed(e.to_string()))?,
        };

        Ok(Self {
            specversion,
            event_type: envelope
                .event_type
                .ok_or(EnvelopeError::MissingAttribute("type"))?,
            source: envelope
                .source
                .ok_or(EnvelopeError::MissingAttribute("source"))?,
            id: envelope.id.ok_or(EnvelopeError::MissingAttribute("id"))?,
            time: envelope.time,
            datacontenttype: envelope.datacontenttype,
            data,
        })
    }
}

/// Binary-mode reply: attributes as `ce-*` headers, data as the body.
impl IntoResponse for CloudEvent {
    fn into_response(self) -> Response {
        let time = self.time.unwrap_or_else(Utc::now).to_rfc3339();
        let content_type = self
            .datacontenttype
            .unwrap_or_else(|| JSON_CONTENT_TYPE.to_string());

        (
            StatusCode::OK,
            [
                (CE_SPECVERSION, self.specversion),
                (CE_TYPE, self.event_type),
                (CE_SOURCE, self.source),
                (CE_ID, self.id),
                (CE_TIME, time),
                ("content-type", content_type),
            ],
            self.data,
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct StructuredEnvelope {
    specversion: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    source: Option<String>,
    id: Option<String>,
    time: Option<DateTime<Utc>>,
    datacontenttype: Option<String>,
    data: Option<serde_json::Value>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, EnvelopeError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(|s| s.trim().to_string())
                .map_err(|_| EnvelopeError::Malformed(format!("header '{name}' is not valid ASCII")))
        })
        .transpose()
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, EnvelopeError> {
    let attribute = name.trim_start_matches("ce-");
    match header_value(headers, name)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(EnvelopeError::MissingAttribute(attribute)),
    }
}

fn check_version(specversion: &str) -> Result<(), EnvelopeError> {
    if specversion == SPEC_VERSION {
        Ok(())
    } else {
        Err(EnvelopeError::UnsupportedVersion(specversion.to_string()))
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, EnvelopeError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| EnvelopeError::Malformed(format!("ce-time '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::CONTENT_TYPE};

    fn binary_headers(event_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CE_SPECVERSION, HeaderValue::from_static("1.0"));
        headers.insert(CE_TYPE, HeaderValue::from_str(event_type).unwrap());
        headers.insert(CE_SOURCE, HeaderValue::from_static("face-extractor"));
        headers.insert(CE_ID, HeaderValue::from_static("evt-1"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers
    }

    #[test]
    fn test_operation_is_resolved_from_type() {
        assert_eq!(Operation::from("insert"), Operation::Insert);
        assert_eq!(Operation::from("get"), Operation::Get);
        assert_eq!(Operation::from("delete"), Operation::Unknown);
        assert_eq!(Operation::from("INSERT"), Operation::Unknown);
    }

    #[test]
    fn test_binary_mode_event() {
        let body = Bytes::from_static(br#"{"id":"a@example.com"}"#);
        let event = CloudEvent::from_http(&binary_headers("get"), body.clone()).unwrap();

        assert_eq!(event.operation(), Operation::Get);
        assert_eq!(event.source, "face-extractor");
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.datacontenttype.as_deref(), Some(JSON_CONTENT_TYPE));
        assert_eq!(event.time, None);
        assert_eq!(event.data, body);
    }

    #[test]
    fn test_binary_mode_missing_attribute() {
        let mut headers = binary_headers("insert");
        headers.remove(CE_SOURCE);

        let err = CloudEvent::from_http(&headers, Bytes::new()).unwrap_err();
        assert_eq!(err, EnvelopeError::MissingAttribute("source"));
    }

    #[test]
    fn test_binary_mode_rejects_other_versions() {
        let mut headers = binary_headers("insert");
        headers.insert(CE_SPECVERSION, HeaderValue::from_static("0.3"));

        let err = CloudEvent::from_http(&headers, Bytes::new()).unwrap_err();
        assert_eq!(err, EnvelopeError::UnsupportedVersion("0.3".to_string()));
    }

    #[test]
    fn test_binary_mode_parses_time() {
        let mut headers = binary_headers("insert");
        headers.insert(CE_TIME, HeaderValue::from_static("2024-05-01T10:00:00Z"));
        let event = CloudEvent::from_http(&headers, Bytes::new()).unwrap();
        assert!(event.time.is_some());

        headers.insert(CE_TIME, HeaderValue::from_static("yesterday"));
        let err = CloudEvent::from_http(&headers, Bytes::new()).unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed(_)));
    }

    #[test]
    fn test_structured_mode_event() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/cloudevents+json; charset=utf-8"),
        );
        let body = Bytes::from_static(
            br#"{"specversion":"1.0","type":"insert","source":"s","id":"1",
                "data":{"id":"a@example.com","embeddings":"xyz"}}"#,
        );

        let event = CloudEvent::from_http(&headers, body).unwrap();
        assert_eq!(event.operation(), Operation::Insert);

        let data: serde_json::Value = serde_json::from_slice(&event.data).unwrap();
        assert_eq!(data["embeddings"], "xyz");
    }

    #[test]
    fn test_structured_mode_content_type_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/CloudEvents+JSON"),
        );
        let body = Bytes::from_static(
            br#"{"specversion":"1.0","type":"get","source":"s","id":"1",
                "data":{"id":"a@example.com"}}"#,
        );

        let event = CloudEvent::from_http(&headers, body).unwrap();
        assert_eq!(event.operation(), Operation::Get);
    }

    #[test]
    fn test_structured_mode_missing_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(STRUCTURED_CONTENT_TYPE));
        let body = Bytes::from_static(br#"{"specversion":"1.0","source":"s","id":"1"}"#);

        let err = CloudEvent::from_http(&headers, body).unwrap_err();
        assert_eq!(err, EnvelopeError::MissingAttribute("type"));
    }

    #[test]
    fn test_reply_is_written_in_binary_mode() {
        let reply = CloudEvent::reply(ReplyType::Inserter, r#"{"message":"Success"}"#);
        let id = reply.id.clone();
        let response = reply.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CE_SPECVERSION], "1.0");
        assert_eq!(headers[CE_TYPE], "inserter");
        assert_eq!(headers[CE_SOURCE], SERVICE_SOURCE);
        assert_eq!(headers[CE_ID], id.as_str());
        assert_eq!(headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert!(headers.contains_key(CE_TIME));
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 7);
    }
}
