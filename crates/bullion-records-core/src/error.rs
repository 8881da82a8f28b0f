//! Error types for the bullion records core.

use thiserror::Error;

use crate::kind::RecordKind;

/// Core errors that can occur while handling keys and records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown record kind: {0}")]
    UnknownKind(String),

    #[error("malformed record key: {0}")]
    MalformedKey(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for caller-supplied field values and stored records.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("incorrect number of arguments for {operation}: expected {expected}, got {got}")]
    ArgumentCount {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid value {value:?} for {kind}.{field}: {reason}")]
    InvalidField {
        kind: RecordKind,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("record of kind {kind} is missing field {field}")]
    MissingField {
        kind: RecordKind,
        field: &'static str,
    },

    #[error("record of kind {kind} has unexpected field {field}")]
    UnexpectedField { kind: RecordKind, field: String },
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            CoreError::EncodingError(e.to_string())
        } else {
            CoreError::DecodingError(e.to_string())
        }
    }
}
