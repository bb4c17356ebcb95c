//! Event data <-> typed request/reply conversion.
//!
//! Decoding and validation are separate steps so a decode failure and a
//! missing field surface as different error kinds.

use validator::Validate;

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::models::{GetRequest, InsertRequest, ReplyBody};

pub const INSERT_FIELDS_REQUIRED: &str = "id or embeddings cannot be empty";
pub const GET_ID_REQUIRED: &str = "id cannot be empty";

pub fn decode_insert_request(raw: &[u8]) -> EmbeddingResult<InsertRequest> {
    serde_json::from_slice(raw).map_err(|e| EmbeddingError::Decode(e.to_string()))
}

pub fn validate_insert(req: &InsertRequest) -> EmbeddingResult<()> {
    req.validate()
        .map_err(|_| EmbeddingError::Validation(INSERT_FIELDS_REQUIRED.to_string()))
}

pub fn decode_get_request(raw: &[u8]) -> EmbeddingResult<GetRequest> {
    serde_json::from_slice(raw).map_err(|e| EmbeddingError::Decode(e.to_string()))
}

pub fn validate_get(req: &GetRequest) -> EmbeddingResult<()> {
    req.validate()
        .map_err(|_| EmbeddingError::Validation(GET_ID_REQUIRED.to_string()))
}

/// JSON reply data, tagged `application/json` by the envelope.
pub fn encode_response(reply: &ReplyBody) -> EmbeddingResult<Vec<u8>> {
    serde_json::to_vec(reply).map_err(|e| EmbeddingError::Encode(e.to_string()))
}

/// `{"message": ...}` with no other fields.
pub fn encode_error(message: &str) -> EmbeddingResult<Vec<u8>> {
    encode_response(&ReplyBody::message(message))
}
