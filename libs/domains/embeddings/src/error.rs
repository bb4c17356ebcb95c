use axum_helpers::ErrorCode;
use core_config::ConfigError;
use database::cassandra::CassandraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to convert data: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("record '{0}' not found")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("schema provisioning failed: {0}")]
    Schema(String),

    #[error("failed to encode reply: {0}")]
    Encode(String),

    #[error("invalid store configuration: {0}")]
    Config(String),
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

impl EmbeddingError {
    /// Stable label for the `kind` field of log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store",
            Self::Schema(_) => "schema",
            Self::Encode(_) => "encode",
            Self::Config(_) => "config",
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Decode(_) => ErrorCode::InvalidJson,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Store(_) => ErrorCode::StoreError,
            Self::Schema(_) => ErrorCode::SchemaError,
            Self::Encode(_) => ErrorCode::EncodeError,
            Self::Config(_) => ErrorCode::InternalError,
        }
    }
}

impl From<CassandraError> for EmbeddingError {
    fn from(err: CassandraError) -> Self {
        EmbeddingError::Store(err.to_string())
    }
}

impl From<ConfigError> for EmbeddingError {
    fn from(err: ConfigError) -> Self {
        EmbeddingError::Config(err.to_string())
    }
}
