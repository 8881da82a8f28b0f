//! # Bullion Records Ledger
//!
//! Host ledger abstraction for bullion records. Provides a trait-based
//! interface to ordered key-value state with SQLite and in-memory
//! implementations, plus the range-scan adapter the record store reads
//! through.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Point reads, writes, and range-scan cursors
//! - [`LedgerCursor`] - A host cursor over `[start, end)`
//! - [`RangeScan`] - Scoped adapter that closes its cursor exactly once
//! - [`SqliteLedger`] - SQLite-based persistent ledger
//! - [`MemoryLedger`] - In-memory ledger for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bullion_records_ledger::{LedgerExt, SqliteLedger};
//! use bullion_records_core::{RecordKind, ScanRange};
//!
//! let ledger = SqliteLedger::open("ledger.db").unwrap();
//! let entries = ledger
//!     .scan(&ScanRange::for_kind(RecordKind::Bar))
//!     .unwrap()
//!     .collect_all()
//!     .unwrap();
//! println!("{} bars", entries.len());
//! ```
//!
//! ## Design Notes
//!
//! - **Empty means absent**: reads of missing keys return empty bytes
//! - **Paired release**: every opened scan is closed exactly once, on every
//!   exit path, by [`RangeScan`]
//! - **No isolation**: concurrent writers are the host's concern

pub mod error;
pub mod memory;
pub mod migration;
pub mod scan;
pub mod sqlite;
pub mod traits;

pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;
pub use scan::RangeScan;
pub use sqlite::{SqliteLedger, SqliteLedgerConfig, DEFAULT_PAGE_SIZE};
pub use traits::{Ledger, LedgerCursor, LedgerEntry, LedgerExt};
