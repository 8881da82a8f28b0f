//! Error types for the record store.

use bullion_records_core::{CoreError, RecordKind, ValidationError};
use bullion_records_ledger::LedgerError;
use thiserror::Error;

use crate::id::IdGenerationError;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// Wrong argument count or an invalid field value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The identifier source could not produce an identifier.
    #[error("identifier generation failed: {0}")]
    IdentifierGeneration(#[from] IdGenerationError),

    /// Host ledger fault, including range-scan open and read failures.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Encoding or key error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Stored bytes are not a valid record of the expected kind.
    #[error("corrupt {kind} record under {key}: {reason}")]
    CorruptRecord {
        kind: RecordKind,
        key: String,
        reason: String,
    },
}

impl RecordStoreError {
    /// Whether the caller supplied the wrong number of arguments.
    pub fn is_argument_count(&self) -> bool {
        matches!(
            self,
            RecordStoreError::Validation(ValidationError::ArgumentCount { .. })
        )
    }

    /// Whether the host rejected a range scan.
    pub fn is_scan_open(&self) -> bool {
        matches!(self, RecordStoreError::Ledger(e) if e.is_scan_open())
    }

    /// Whether a range scan failed while advancing.
    pub fn is_scan_read(&self) -> bool {
        matches!(self, RecordStoreError::Ledger(e) if e.is_scan_read())
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, RecordStoreError>;
