//! Error types for the ledger module.

use thiserror::Error;

/// Errors raised by a host ledger or the range-scan adapter.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The key cannot be stored or looked up.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// The host rejected a range scan.
    #[error("cannot open scan over [{start:?}, {end:?}): {reason}")]
    ScanOpen {
        start: String,
        end: String,
        reason: String,
    },

    /// The cursor reported a fault while advancing.
    #[error("scan read failed: {0}")]
    ScanRead(String),

    /// Releasing the cursor failed.
    #[error("scan close failed: {0}")]
    ScanClose(String),

    /// `next` was called with no entries left.
    #[error("cursor exhausted")]
    CursorExhausted,

    /// The cursor was used after being closed.
    #[error("cursor already closed")]
    CursorClosed,

    /// Host read fault.
    #[error("read failed for {key:?}: {reason}")]
    Read { key: String, reason: String },

    /// Host write fault.
    #[error("write failed for {key:?}: {reason}")]
    Write { key: String, reason: String },

    /// A lock guarding ledger state was poisoned by a panicking writer.
    #[error("ledger lock poisoned: {0}")]
    LockPoisoned(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Whether this error came from opening a range scan.
    pub fn is_scan_open(&self) -> bool {
        matches!(self, LedgerError::ScanOpen { .. })
    }

    /// Whether this error came from advancing a range scan.
    pub fn is_scan_read(&self) -> bool {
        matches!(
            self,
            LedgerError::ScanRead(_) | LedgerError::CursorExhausted | LedgerError::CursorClosed
        )
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
