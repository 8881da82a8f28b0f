//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use bullion_records::{Dispatcher, RecordKey, RecordKind, RecordStore, RecordStoreConfig};
use bullion_records_ledger::{Ledger, MemoryLedger};

use crate::doubles::{CountingLedger, FaultPlan, LedgerCounters, SequentialIds};

/// A record store over a counting memory ledger with deterministic ids.
pub struct TestFixture {
    /// The store under test.
    pub store: RecordStore<CountingLedger<MemoryLedger>, SequentialIds>,
    counters: Arc<LedgerCounters>,
}

impl TestFixture {
    /// Create a fixture with no injected faults.
    pub fn new() -> Self {
        Self::with_config(RecordStoreConfig::default())
    }

    /// Create with a specific store configuration.
    pub fn with_config(config: RecordStoreConfig) -> Self {
        let ledger = CountingLedger::new(MemoryLedger::new());
        let counters = ledger.counters();
        Self {
            store: RecordStore::new(ledger, SequentialIds::new(), config),
            counters,
        }
    }

    /// Call counters for the underlying ledger.
    pub fn counters(&self) -> &LedgerCounters {
        &self.counters
    }

    /// The memory ledger beneath the counting wrapper.
    pub fn memory(&self) -> &MemoryLedger {
        self.store.ledger().inner()
    }

    /// Number of keys currently stored.
    pub fn key_count(&self) -> usize {
        self.memory().len().unwrap_or_default()
    }

    /// Inject faults into subsequent ledger calls.
    pub fn inject(&self, plan: FaultPlan) {
        self.store.ledger().set_plan(plan);
    }

    /// Create a record of `kind` from [`sample_values`].
    pub fn create_sample(&self, kind: RecordKind) -> RecordKey {
        self.store
            .create(kind, &sample_values(kind))
            .unwrap_or_else(|e| panic!("sample {kind} create failed: {e}"))
    }

    /// Create `count` sample records of `kind`, returning keys in creation order.
    pub fn create_samples(&self, kind: RecordKind, count: usize) -> Vec<RecordKey> {
        (0..count).map(|_| self.create_sample(kind)).collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A dispatcher over a fresh memory ledger with deterministic ids.
pub fn dispatcher_fixture() -> Dispatcher<MemoryLedger, SequentialIds> {
    Dispatcher::new(RecordStore::new(
        MemoryLedger::new(),
        SequentialIds::new(),
        RecordStoreConfig::default(),
    ))
}

/// Valid positional values for one record of `kind`.
pub fn sample_values(kind: RecordKind) -> Vec<&'static str> {
    match kind {
        RecordKind::Bar => vec!["Vault-7", "SN-001", "999.9", "RefinerX", "true", "1000"],
        RecordKind::Buy => vec!["ORD-100", "5400", "5454", "quoted", "pending", "80.25", "user-1"],
        RecordKind::Sell => vec!["ORD-200", "12.5", "840", "user-2"],
        RecordKind::Send => vec!["ORD-300", "3", "user-1", "user-2"],
        RecordKind::Trade => vec!["ORD-400", "0.75", "user-3"],
    }
}

/// Total keys held by a ledger, across every kind.
pub fn total_keys<L: Ledger>(ledger: &L) -> usize {
    use bullion_records_ledger::LedgerExt;

    RecordKind::ALL
        .iter()
        .map(|&kind| {
            ledger
                .scan(&bullion_records::ScanRange::for_kind(kind))
                .and_then(|scan| scan.collect_all())
                .map(|entries| entries.len())
                .unwrap_or_default()
        })
        .sum()
}
