//! Test doubles for the host ledger and the identifier source.
//!
//! [`CountingLedger`] wraps any [`Ledger`], counts the calls the record store
//! makes on it, and injects faults according to a [`FaultPlan`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use bullion_records::{IdGenerationError, IdGenerator};
use bullion_records_ledger::{Ledger, LedgerCursor, LedgerEntry, LedgerError, Result};

/// Faults to inject into a [`CountingLedger`].
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// Reject every `open_scan` with `ScanOpen`.
    pub fail_open: bool,
    /// Fail `next_entry` with `ScanRead` after this many entries.
    pub fail_read_after: Option<usize>,
    /// Fail cursor `close` with `ScanClose` (after counting it).
    pub fail_close: bool,
    /// Fail every `put_state` with a write fault.
    pub fail_put: bool,
}

impl FaultPlan {
    /// No faults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Reject every scan at open.
    pub fn fail_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Fail the read after `entries` successful ones.
    pub fn fail_read_after(entries: usize) -> Self {
        Self {
            fail_read_after: Some(entries),
            ..Self::default()
        }
    }

    /// Fail every cursor close.
    pub fn fail_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    /// Fail every write.
    pub fn fail_put() -> Self {
        Self {
            fail_put: true,
            ..Self::default()
        }
    }
}

/// Call counts observed by a [`CountingLedger`].
#[derive(Debug, Default)]
pub struct LedgerCounters {
    gets: AtomicUsize,
    puts: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl LedgerCounters {
    /// Point reads.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Successful writes only.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Scans the host accepted.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Calls to cursor `close`, including failing ones.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A ledger wrapper that counts calls and injects faults.
pub struct CountingLedger<L: Ledger> {
    inner: L,
    counters: Arc<LedgerCounters>,
    plan: Mutex<FaultPlan>,
}

impl<L: Ledger> CountingLedger<L> {
    /// Wrap `inner` with no faults.
    pub fn new(inner: L) -> Self {
        Self::with_plan(inner, FaultPlan::none())
    }

    /// Wrap `inner` with a fault plan.
    pub fn with_plan(inner: L, plan: FaultPlan) -> Self {
        Self {
            inner,
            counters: Arc::new(LedgerCounters::default()),
            plan: Mutex::new(plan),
        }
    }

    /// The wrapped ledger.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Shared call counters.
    pub fn counters(&self) -> Arc<LedgerCounters> {
        Arc::clone(&self.counters)
    }

    /// Replace the fault plan for subsequent calls.
    pub fn set_plan(&self, plan: FaultPlan) {
        match self.plan.lock() {
            Ok(mut guard) => *guard = plan,
            Err(poisoned) => *poisoned.into_inner() = plan,
        }
    }

    fn plan(&self) -> FaultPlan {
        match self.plan.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<L: Ledger> Ledger for CountingLedger<L> {
    fn get_state(&self, key: &str) -> Result<Bytes> {
        self.counters.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_state(key)
    }

    fn put_state(&self, key: &str, value: Bytes) -> Result<()> {
        if self.plan().fail_put {
            return Err(LedgerError::Write {
                key: key.to_string(),
                reason: "injected write fault".into(),
            });
        }
        self.inner.put_state(key, value)?;
        self.counters.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_scan(&self, start: &str, end: &str) -> Result<Box<dyn LedgerCursor + '_>> {
        let plan = self.plan();
        if plan.fail_open {
            return Err(LedgerError::ScanOpen {
                start: start.to_string(),
                end: end.to_string(),
                reason: "injected open fault".into(),
            });
        }
        let inner = self.inner.open_scan(start, end)?;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingCursor {
            inner,
            counters: Arc::clone(&self.counters),
            reads_left: plan.fail_read_after,
            fail_close: plan.fail_close,
        }))
    }
}

struct CountingCursor<'a> {
    inner: Box<dyn LedgerCursor + 'a>,
    counters: Arc<LedgerCounters>,
    reads_left: Option<usize>,
    fail_close: bool,
}

impl LedgerCursor for CountingCursor<'_> {
    fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }

    fn next_entry(&mut self) -> Result<LedgerEntry> {
        match self.reads_left {
            Some(0) => return Err(LedgerError::ScanRead("injected read fault".into())),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        self.inner.next_entry()
    }

    fn close(&mut self) -> Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        let closed = self.inner.close();
        if self.fail_close {
            return Err(LedgerError::ScanClose("injected close fault".into()));
        }
        closed
    }
}

/// Deterministic identifiers: zero-padded counter values `00000001`, `00000002`, ...
///
/// Padding keeps key order equal to creation order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting from one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> std::result::Result<String, IdGenerationError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{:08}", n))
    }
}

/// An identifier source that always fails, or returns fixed bad text.
#[derive(Debug, Clone, Default)]
pub struct FailingIds {
    /// When set, returned as the identifier instead of an error.
    pub bad_id: Option<String>,
}

impl FailingIds {
    /// Fails with an error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeeds with text that is not a valid identifier.
    pub fn returning(bad_id: impl Into<String>) -> Self {
        Self {
            bad_id: Some(bad_id.into()),
        }
    }
}

impl IdGenerator for FailingIds {
    fn next_id(&self) -> std::result::Result<String, IdGenerationError> {
        match &self.bad_id {
            Some(id) => Ok(id.clone()),
            None => Err(IdGenerationError("identifier source unavailable".into())),
        }
    }
}
