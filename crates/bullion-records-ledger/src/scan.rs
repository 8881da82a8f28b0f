//! The range-scan adapter.
//!
//! [`RangeScan`] wraps a host [`LedgerCursor`] and owns its release: the
//! cursor is closed exactly once, whether the scan runs to completion, is
//! abandoned early, fails mid-way, or is dropped during unwinding.

use bullion_records_core::ScanRange;

use crate::error::{LedgerError, Result};
use crate::traits::{Ledger, LedgerCursor, LedgerEntry};

/// A lazy, finite, key-ascending scan over one range.
///
/// Not restartable: open a new scan to re-read the range. Iterating yields
/// `Result<LedgerEntry>`; after the first error the scan is fused and yields
/// nothing more.
pub struct RangeScan<'a> {
    cursor: Box<dyn LedgerCursor + 'a>,
    range: ScanRange,
    yielded: usize,
    failed: bool,
    closed: bool,
}

impl<'a> RangeScan<'a> {
    /// Ask the host for a cursor over `range`.
    pub fn open<L: Ledger + ?Sized>(ledger: &'a L, range: &ScanRange) -> Result<Self> {
        let cursor = ledger.open_scan(&range.start, &range.end)?;
        tracing::debug!(start = %range.start, end = %range.end, "range scan opened");
        Ok(Self {
            cursor,
            range: range.clone(),
            yielded: 0,
            failed: false,
            closed: false,
        })
    }

    /// The range being scanned.
    pub fn range(&self) -> &ScanRange {
        &self.range
    }

    /// Number of entries produced so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Whether another entry remains.
    pub fn has_next(&mut self) -> bool {
        !self.closed && !self.failed && self.cursor.has_next()
    }

    /// Advance and return the next entry.
    ///
    /// Any host fault is reported as [`LedgerError::ScanRead`] and fuses the
    /// scan.
    pub fn next_entry(&mut self) -> Result<LedgerEntry> {
        if self.closed {
            return Err(LedgerError::CursorClosed);
        }
        if self.failed {
            return Err(LedgerError::CursorExhausted);
        }
        match self.cursor.next_entry() {
            Ok(entry) => {
                self.yielded += 1;
                Ok(entry)
            }
            Err(e) => {
                self.failed = true;
                Err(match e {
                    LedgerError::ScanRead(_)
                    | LedgerError::CursorExhausted
                    | LedgerError::CursorClosed => e,
                    LedgerError::Database(db) => LedgerError::ScanRead(db.to_string()),
                    other => LedgerError::ScanRead(other.to_string()),
                })
            }
        }
    }

    /// Drain the scan into a vector and release the cursor.
    ///
    /// Either every entry is returned or the first error is; partial results
    /// are discarded. The cursor is closed in both cases.
    pub fn collect_all(mut self) -> Result<Vec<LedgerEntry>> {
        let mut entries = Vec::new();
        let outcome = loop {
            if !self.has_next() {
                break Ok(());
            }
            match self.next_entry() {
                Ok(entry) => entries.push(entry),
                Err(e) => break Err(e),
            }
        };
        let closed = self.release();
        outcome?;
        closed?;
        Ok(entries)
    }

    /// Release the cursor now instead of on drop.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(
            start = %self.range.start,
            end = %self.range.end,
            entries = self.yielded,
            "range scan closed"
        );
        self.cursor.close().map_err(|e| match e {
            LedgerError::ScanClose(msg) => LedgerError::ScanClose(msg),
            other => LedgerError::ScanClose(other.to_string()),
        })
    }
}

impl Iterator for RangeScan<'_> {
    type Item = Result<LedgerEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_entry())
        } else {
            None
        }
    }
}

impl Drop for RangeScan<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("failed to release range scan cursor: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;
    use crate::traits::LedgerExt;
    use bytes::Bytes;

    fn seeded() -> MemoryLedger {
        let ledger = MemoryLedger::new();
        for key in ["Bar-1", "Bar-2", "Bar-3", "Buy-1", "Aaa-1"] {
            ledger
                .put_state(key, Bytes::from(format!("{{\"id\":\"{key}\"}}")))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_scan_yields_range_in_order() {
        let ledger = seeded();
        let range = ScanRange::new("Bar-", "Bar.");
        let keys: Vec<String> = ledger
            .scan(&range)
            .unwrap()
            .map(|e| e.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["Bar-1", "Bar-2", "Bar-3"]);
    }

    #[test]
    fn test_scan_end_is_exclusive() {
        let ledger = seeded();
        let range = ScanRange::new("Bar-1", "Bar-3");
        let entries = ledger.scan(&range).unwrap().collect_all().unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Bar-1", "Bar-2"]);
    }

    #[test]
    fn test_empty_range() {
        let ledger = seeded();
        let mut scan = ledger.scan(&ScanRange::new("Sell-", "Sell.")).unwrap();
        assert!(!scan.has_next());
        assert!(matches!(
            scan.next_entry(),
            Err(LedgerError::CursorExhausted)
        ));
        scan.close().unwrap();
    }

    #[test]
    fn test_inverted_range_fails_to_open() {
        let ledger = seeded();
        let err = ledger
            .scan(&ScanRange::new("Bar.", "Bar-"))
            .err()
            .unwrap();
        assert!(err.is_scan_open());
    }

    #[test]
    fn test_yielded_counts_entries() {
        let ledger = seeded();
        let mut scan = ledger.scan(&ScanRange::new("Bar-", "Bar.")).unwrap();
        scan.next_entry().unwrap();
        scan.next_entry().unwrap();
        assert_eq!(scan.yielded(), 2);
        assert!(scan.has_next());
    }

    #[test]
    fn test_not_restartable() {
        let ledger = seeded();
        let range = ScanRange::new("Bar-", "Bar.");
        let mut scan = ledger.scan(&range).unwrap();
        while scan.has_next() {
            scan.next_entry().unwrap();
        }
        assert!(!scan.has_next());
        assert_eq!(scan.next().map(|r| r.is_ok()), None);

        // A fresh open sees the whole range again.
        assert_eq!(ledger.scan(&range).unwrap().count(), 3);
    }

    /// Fails every read with a fixed host error.
    struct FaultyCursor {
        fault: Option<LedgerError>,
        closes: usize,
    }

    impl LedgerCursor for FaultyCursor {
        fn has_next(&mut self) -> bool {
            true
        }

        fn next_entry(&mut self) -> Result<LedgerEntry> {
            Err(self.fault.take().unwrap_or(LedgerError::CursorExhausted))
        }

        fn close(&mut self) -> Result<()> {
            self.closes += 1;
            Ok(())
        }
    }

    fn scan_over(cursor: FaultyCursor) -> RangeScan<'static> {
        RangeScan {
            cursor: Box::new(cursor),
            range: ScanRange::new("Bar-", "Bar."),
            yielded: 0,
            failed: false,
            closed: false,
        }
    }

    #[test]
    fn test_host_faults_become_scan_read() {
        let faults = [
            LedgerError::Read {
                key: "Bar-1".into(),
                reason: "transport reset".into(),
            },
            LedgerError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            LedgerError::LockPoisoned("state".into()),
            LedgerError::Database(rusqlite::Error::InvalidQuery),
            LedgerError::ScanRead("corrupt page".into()),
        ];
        for fault in faults {
            let mut scan = scan_over(FaultyCursor {
                fault: Some(fault),
                closes: 0,
            });
            assert!(scan.has_next());
            let err = scan.next_entry().unwrap_err();
            assert!(matches!(err, LedgerError::ScanRead(_)), "{err}");
            assert!(err.is_scan_read());

            // Fused after the first fault.
            assert!(!scan.has_next());
            scan.close().unwrap();
        }
    }
}
