//! Type-safe error codes for API responses.
//!
//! Each error code has a string form for clients (e.g. "VALIDATION_ERROR")
//! and an integer for logs and metrics (e.g. 1001).
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000s)
    /// Request validation failed
    ValidationError,

    /// Event envelope is missing attributes or uses an unsupported version
    InvalidEvent,

    /// Event data is not valid JSON for the requested operation
    InvalidJson,

    /// Requested resource was not found
    NotFound,

    // Server errors (1000s)
    /// An unexpected internal server error occurred
    InternalError,

    // Store errors (2000s)
    /// A statement against the backing store failed
    StoreError,

    /// Keyspace or table provisioning failed
    SchemaError,

    // Serialization errors (5000s)
    /// Reply could not be serialized
    EncodeError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidEvent => "INVALID_EVENT",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::StoreError => "STORE_ERROR",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::EncodeError => "ENCODE_ERROR",
        }
    }

    /// Integer code for logging and monitoring.
    ///
    /// - 1000-1999: request and generic server errors
    /// - 2000-2999: store errors
    /// - 5000-5999: serialization errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidEvent => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,

            Self::StoreError => 2001,
            Self::SchemaError => 2002,

            Self::EncodeError => 5001,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
