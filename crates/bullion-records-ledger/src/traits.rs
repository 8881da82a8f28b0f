//! Ledger trait: the abstract interface to the host's ordered key-value state.
//!
//! The record store is host-agnostic. Implementations include SQLite
//! (persistent) and in-memory (for tests); a chaincode runtime would supply
//! its own.

use std::sync::Arc;

use bytes::Bytes;

use bullion_records_core::ScanRange;

use crate::error::Result;
use crate::scan::RangeScan;

/// One `(key, value)` pair produced by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The ledger key.
    pub key: String,
    /// The raw value bytes, exactly as written.
    pub value: Bytes,
}

impl LedgerEntry {
    /// Create an entry.
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A host-side cursor over an ordered key range.
///
/// Cursors are synchronous. `close` releases host resources and must be
/// called exactly once; [`RangeScan`] enforces that for callers.
pub trait LedgerCursor {
    /// Whether another entry remains.
    fn has_next(&mut self) -> bool;

    /// Advance and return the next entry.
    fn next_entry(&mut self) -> Result<LedgerEntry>;

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;
}

/// The host ledger: ordered key-value state with point reads, writes and
/// range scans.
///
/// # Design Notes
///
/// - **Empty means absent**: `get_state` returns empty bytes for a missing
///   key, never an error.
/// - **Half-open scans**: `open_scan` covers `[start, end)` in ascending key
///   order and fails with `ScanOpen` when the host rejects the range.
/// - **No isolation here**: concurrent writers to the same key are the
///   host's concern.
pub trait Ledger: Send + Sync {
    /// Read the value stored under `key`, or empty bytes if there is none.
    fn get_state(&self, key: &str) -> Result<Bytes>;

    /// Write `value` under `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: Bytes) -> Result<()>;

    /// Open a cursor over `[start, end)`.
    fn open_scan(&self, start: &str, end: &str) -> Result<Box<dyn LedgerCursor + '_>>;
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    fn get_state(&self, key: &str) -> Result<Bytes> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: Bytes) -> Result<()> {
        (**self).put_state(key, value)
    }

    fn open_scan(&self, start: &str, end: &str) -> Result<Box<dyn LedgerCursor + '_>> {
        (**self).open_scan(start, end)
    }
}

/// Extension trait for common ledger patterns.
pub trait LedgerExt: Ledger {
    /// Read a key, mapping the host's empty-bytes answer to `None`.
    fn get_optional(&self, key: &str) -> Result<Option<Bytes>> {
        let value = self.get_state(key)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    /// Open a [`RangeScan`] over `range`.
    fn scan(&self, range: &ScanRange) -> Result<RangeScan<'_>> {
        RangeScan::open(self, range)
    }
}

impl<L: Ledger + ?Sized> LedgerExt for L {}
