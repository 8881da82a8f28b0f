//! In-memory implementation of the Ledger trait.
//!
//! This is primarily for testing. It has the same ordering and range
//! semantics as SQLite but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;

use crate::error::{LedgerError, Result};
use crate::traits::{Ledger, LedgerCursor, LedgerEntry};

/// In-memory ledger implementation.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
pub struct MemoryLedger {
    state: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryLedger {
    /// Create a new empty in-memory ledger.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// All stored keys, ascending.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Bytes>>> {
        self.state
            .read()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Bytes>>> {
        self.state
            .write()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for MemoryLedger {
    fn get_state(&self, key: &str) -> Result<Bytes> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey(key.to_string()));
        }
        Ok(self.read()?.get(key).cloned().unwrap_or_default())
    }

    fn put_state(&self, key: &str, value: Bytes) -> Result<()> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey(key.to_string()));
        }
        self.write()?.insert(key.to_string(), value);
        Ok(())
    }

    fn open_scan(&self, start: &str, end: &str) -> Result<Box<dyn LedgerCursor + '_>> {
        if start > end {
            return Err(LedgerError::ScanOpen {
                start: start.to_string(),
                end: end.to_string(),
                reason: "start key sorts after end key".into(),
            });
        }

        let state = self.read().map_err(|e| LedgerError::ScanOpen {
            start: start.to_string(),
            end: end.to_string(),
            reason: e.to_string(),
        })?;

        // Snapshot the range so later writes do not disturb the cursor.
        let entries: Vec<LedgerEntry> = state
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(k, v)| LedgerEntry::new(k.clone(), v.clone()))
            .collect();

        Ok(Box::new(MemoryCursor {
            entries: entries.into_iter().peekable(),
            closed: false,
        }))
    }
}

/// Cursor over a snapshot of a [`MemoryLedger`] range.
struct MemoryCursor {
    entries: std::iter::Peekable<std::vec::IntoIter<LedgerEntry>>,
    closed: bool,
}

impl LedgerCursor for MemoryCursor {
    fn has_next(&mut self) -> bool {
        !self.closed && self.entries.peek().is_some()
    }

    fn next_entry(&mut self) -> Result<LedgerEntry> {
        if self.closed {
            return Err(LedgerError::CursorClosed);
        }
        self.entries.next().ok_or(LedgerError::CursorExhausted)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(LedgerError::ScanClose("cursor closed twice".into()));
        }
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LedgerExt;
    use bullion_records_core::{RecordKind, ScanRange};
    use proptest::prelude::*;

    #[test]
    fn test_memory_ledger_basic() {
        let ledger = MemoryLedger::new();

        // Put
        ledger
            .put_state("Bar-1", Bytes::from_static(b"{\"id\":\"Bar-1\"}"))
            .unwrap();

        // Get
        let value = ledger.get_state("Bar-1").unwrap();
        assert_eq!(&value[..], b"{\"id\":\"Bar-1\"}");
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_missing_key_reads_empty() {
        let ledger = MemoryLedger::new();
        assert!(ledger.get_state("Bar-404").unwrap().is_empty());
        assert_eq!(ledger.get_optional("Bar-404").unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let ledger = MemoryLedger::new();
        ledger.put_state("k", Bytes::from_static(b"1")).unwrap();
        ledger.put_state("k", Bytes::from_static(b"2")).unwrap();
        assert_eq!(&ledger.get_state("k").unwrap()[..], b"2");
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let ledger = MemoryLedger::new();
        assert!(matches!(
            ledger.put_state("", Bytes::new()),
            Err(LedgerError::InvalidKey(_))
        ));
        assert!(matches!(
            ledger.get_state(""),
            Err(LedgerError::InvalidKey(_))
        ));
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn test_scan_is_a_snapshot() {
        let ledger = MemoryLedger::new();
        ledger.put_state("Sell-1", Bytes::from_static(b"{}")).unwrap();

        let mut cursor = ledger.open_scan("Sell-", "Sell.").unwrap();
        ledger.put_state("Sell-2", Bytes::from_static(b"{}")).unwrap();

        assert!(cursor.has_next());
        assert_eq!(cursor.next_entry().unwrap().key, "Sell-1");
        assert!(!cursor.has_next());
        cursor.close().unwrap();
    }

    #[test]
    fn test_scan_is_half_open() {
        let ledger = MemoryLedger::new();
        for key in ["Sell", "Sell-", "Sell-a", "Sell.", "Sell/"] {
            ledger.put_state(key, Bytes::from_static(b"{}")).unwrap();
        }

        let mut cursor = ledger.open_scan("Sell-", "Sell.").unwrap();
        let mut keys = Vec::new();
        while cursor.has_next() {
            keys.push(cursor.next_entry().unwrap().key);
        }
        cursor.close().unwrap();
        assert_eq!(keys, vec!["Sell-", "Sell-a"]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let ledger = MemoryLedger::new();
        let err = ledger.open_scan("b", "a").err().unwrap();
        assert!(err.is_scan_open());
    }

    #[test]
    fn test_cursor_rejects_double_close() {
        let ledger = MemoryLedger::new();
        let mut cursor = ledger.open_scan("a", "b").unwrap();
        cursor.close().unwrap();
        assert!(!cursor.has_next());
        assert!(matches!(cursor.next_entry(), Err(LedgerError::CursorClosed)));
        assert!(cursor.close().is_err());
    }

    fn ledger_key() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["Bar", "Bars", "Ba", "Buy", "Sell", "Send", "Trade"]),
            prop::sample::select(vec!["-", ".", ",", ""]),
            "[a-z0-9]{0,4}",
        )
            .prop_map(|(head, sep, tail)| format!("{}{}{}", head, sep, tail))
    }

    proptest! {
        #[test]
        fn test_kind_scan_yields_exactly_prefixed_keys(
            keys in prop::collection::btree_set(ledger_key(), 0..32),
            kind in prop::sample::select(RecordKind::ALL.to_vec()),
        ) {
            let ledger = MemoryLedger::new();
            for key in &keys {
                ledger.put_state(key, Bytes::from_static(b"{}")).unwrap();
            }

            let range = ScanRange::for_kind(kind);
            let scanned: Vec<String> = ledger
                .scan(&range)
                .unwrap()
                .collect_all()
                .unwrap()
                .into_iter()
                .map(|entry| entry.key)
                .collect();
            let expected: Vec<String> = keys
                .iter()
                .filter(|key| key.starts_with(range.start.as_str()))
                .cloned()
                .collect();
            prop_assert_eq!(scanned, expected);
        }
    }
}
