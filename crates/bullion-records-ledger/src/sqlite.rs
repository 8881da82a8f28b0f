//! SQLite implementation of the Ledger trait.
//!
//! A persistent ordered key-value host for local deployments and tests. It
//! uses rusqlite with bundled SQLite. Range scans page through the table in
//! key order instead of loading the whole range up front.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::migration;
use crate::traits::{Ledger, LedgerCursor, LedgerEntry};

/// Default number of rows fetched per cursor page.
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Configuration for [`SqliteLedger`].
#[derive(Debug, Clone)]
pub struct SqliteLedgerConfig {
    /// Rows fetched per cursor round-trip. Zero is treated as one.
    pub page_size: usize,
}

impl Default for SqliteLedgerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// SQLite-based ledger implementation.
///
/// Thread-safe via internal Mutex.
pub struct SqliteLedger {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    config: SqliteLedgerConfig,
}

impl SqliteLedger {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, SqliteLedgerConfig::default())
    }

    /// Open a SQLite database at the given path with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: SqliteLedgerConfig) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::info!(path = %path.display(), "opened sqlite ledger");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::open_memory_with_config(SqliteLedgerConfig::default())
    }

    /// Open an in-memory SQLite database with explicit configuration.
    pub fn open_memory_with_config(config: SqliteLedgerConfig) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ledger_state", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| LedgerError::LockPoisoned(format!("mutex poisoned: {}", e)))
}

impl Ledger for SqliteLedger {
    fn get_state(&self, key: &str) -> Result<Bytes> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey(key.to_string()));
        }
        let conn = lock(&self.conn)?;
        let value: Option<Vec<u8>> = conn
            .query_row(
                "SELECT value FROM ledger_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.map(Bytes::from).unwrap_or_default())
    }

    fn put_state(&self, key: &str, value: Bytes) -> Result<()> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey(key.to_string()));
        }
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO ledger_state (key, value, written_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, written_at = excluded.written_at",
            params![key, value.as_ref(), migration::now_millis()],
        )?;
        Ok(())
    }

    fn open_scan(&self, start: &str, end: &str) -> Result<Box<dyn LedgerCursor + '_>> {
        let open_error = |reason: String| LedgerError::ScanOpen {
            start: start.to_string(),
            end: end.to_string(),
            reason,
        };

        if start > end {
            return Err(open_error("start key sorts after end key".into()));
        }

        // Probe the connection so a broken host fails at open, not first read.
        {
            let conn = lock(&self.conn).map_err(|e| open_error(e.to_string()))?;
            conn.prepare_cached(PAGE_FROM_START)
                .map_err(|e| open_error(e.to_string()))?;
        }

        Ok(Box::new(SqliteCursor {
            conn: Arc::clone(&self.conn),
            start: start.to_string(),
            end: end.to_string(),
            last_key: None,
            buffer: VecDeque::new(),
            page_size: self.config.page_size.max(1),
            exhausted: false,
            pending_error: None,
            closed: false,
        }))
    }
}

const PAGE_FROM_START: &str = "SELECT key, value FROM ledger_state
     WHERE key >= ?1 AND key < ?2 ORDER BY key LIMIT ?3";

const PAGE_AFTER_KEY: &str = "SELECT key, value FROM ledger_state
     WHERE key > ?1 AND key < ?2 ORDER BY key LIMIT ?3";

/// Lazily paging cursor over a key range.
struct SqliteCursor {
    conn: Arc<Mutex<Connection>>,
    start: String,
    end: String,
    /// Last key handed out; the next page starts strictly after it.
    last_key: Option<String>,
    buffer: VecDeque<LedgerEntry>,
    page_size: usize,
    exhausted: bool,
    /// A page fault seen by `has_next`, surfaced by the following `next_entry`.
    pending_error: Option<LedgerError>,
    closed: bool,
}

impl SqliteCursor {
    fn fetch_page(&mut self) -> Result<()> {
        let conn = lock(&self.conn).map_err(|e| LedgerError::ScanRead(e.to_string()))?;
        let (sql, lower) = match &self.last_key {
            Some(key) => (PAGE_AFTER_KEY, key.as_str()),
            None => (PAGE_FROM_START, self.start.as_str()),
        };
        let limit = i64::try_from(self.page_size).unwrap_or(i64::MAX);

        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| LedgerError::ScanRead(e.to_string()))?;
        let rows = stmt
            .query_map(params![lower, self.end, limit], |row| {
                let key: String = row.get(0)?;
                let value: Vec<u8> = row.get(1)?;
                Ok(LedgerEntry::new(key, value))
            })
            .map_err(|e| LedgerError::ScanRead(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| LedgerError::ScanRead(e.to_string()))?;

        if rows.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            self.last_key = Some(last.key.clone());
        }
        self.buffer.extend(rows);
        Ok(())
    }
}

impl LedgerCursor for SqliteCursor {
    fn has_next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if !self.buffer.is_empty() || self.pending_error.is_some() {
            return true;
        }
        if self.exhausted {
            return false;
        }
        match self.fetch_page() {
            Ok(()) => !self.buffer.is_empty(),
            Err(e) => {
                self.pending_error = Some(e);
                true
            }
        }
    }

    fn next_entry(&mut self) -> Result<LedgerEntry> {
        if self.closed {
            return Err(LedgerError::CursorClosed);
        }
        if let Some(e) = self.pending_error.take() {
            self.exhausted = true;
            self.buffer.clear();
            return Err(e);
        }
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page()?;
        }
        self.buffer.pop_front().ok_or(LedgerError::CursorExhausted)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(LedgerError::ScanClose("cursor closed twice".into()));
        }
        self.closed = true;
        self.buffer.clear();
        self.pending_error = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LedgerExt;
    use bullion_records_core::ScanRange;

    fn seed(ledger: &SqliteLedger, keys: &[&str]) {
        for key in keys {
            ledger
                .put_state(key, Bytes::from(format!("{{\"id\":\"{key}\"}}")))
                .unwrap();
        }
    }

    #[test]
    fn test_put_and_get() {
        let ledger = SqliteLedger::open_memory().unwrap();
        ledger.put_state("Bar-1", Bytes::from_static(b"{}")).unwrap();

        assert_eq!(&ledger.get_state("Bar-1").unwrap()[..], b"{}");
        assert!(ledger.get_state("Bar-2").unwrap().is_empty());
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_put_upserts() {
        let ledger = SqliteLedger::open_memory().unwrap();
        ledger.put_state("k", Bytes::from_static(b"old")).unwrap();
        ledger.put_state("k", Bytes::from_static(b"new")).unwrap();

        assert_eq!(&ledger.get_state("k").unwrap()[..], b"new");
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_scan_pages_in_order() {
        let config = SqliteLedgerConfig { page_size: 2 };
        let ledger = SqliteLedger::open_memory_with_config(config).unwrap();
        seed(
            &ledger,
            &["Sell-5", "Sell-1", "Buy-1", "Sell-3", "Sell-2", "Sell-4", "Send-1"],
        );

        let entries = ledger
            .scan(&ScanRange::new("Sell-", "Sell."))
            .unwrap()
            .collect_all()
            .unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Sell-1", "Sell-2", "Sell-3", "Sell-4", "Sell-5"]);
    }

    #[test]
    fn test_scan_exact_page_boundary() {
        let config = SqliteLedgerConfig { page_size: 2 };
        let ledger = SqliteLedger::open_memory_with_config(config).unwrap();
        seed(&ledger, &["Bar-1", "Bar-2", "Bar-3", "Bar-4"]);

        let count = ledger.scan(&ScanRange::new("Bar-", "Bar.")).unwrap().count();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_scan_empty_range() {
        let ledger = SqliteLedger::open_memory().unwrap();
        seed(&ledger, &["Bar-1"]);

        let mut scan = ledger.scan(&ScanRange::new("Trade-", "Trade.")).unwrap();
        assert!(!scan.has_next());
        scan.close().unwrap();
    }

    #[test]
    fn test_scan_rejects_inverted_range() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let err = ledger.open_scan("z", "a").err().unwrap();
        assert!(err.is_scan_open());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let ledger = SqliteLedger::open(&path).unwrap();
            seed(&ledger, &["Trade-1", "Trade-2"]);
        }

        let ledger = SqliteLedger::open(&path).unwrap();
        assert_eq!(ledger.len().unwrap(), 2);
        assert_eq!(
            &ledger.get_state("Trade-2").unwrap()[..],
            br#"{"id":"Trade-2"}"#
        );
    }

    #[test]
    fn test_cursor_close_twice_fails() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let mut cursor = ledger.open_scan("a", "b").unwrap();
        cursor.close().unwrap();
        assert!(matches!(cursor.next_entry(), Err(LedgerError::CursorClosed)));
        assert!(cursor.close().is_err());
    }

    #[test]
    fn test_page_fault_surfaces_on_next_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let ledger =
            SqliteLedger::open_with_config(&path, SqliteLedgerConfig { page_size: 1 }).unwrap();
        seed(&ledger, &["Sell-1", "Sell-2", "Sell-3"]);

        let mut scan = ledger.scan(&ScanRange::new("Sell-", "Sell.")).unwrap();
        assert!(scan.has_next());
        assert_eq!(scan.next_entry().unwrap().key, "Sell-1");

        // The next page fetch fails once the table is gone.
        let other = Connection::open(&path).unwrap();
        other.execute_batch("DROP TABLE ledger_state;").unwrap();

        assert!(scan.has_next());
        let err = scan.next_entry().unwrap_err();
        assert!(err.is_scan_read(), "{err}");
        assert!(!scan.has_next());
        scan.close().unwrap();
    }
}
