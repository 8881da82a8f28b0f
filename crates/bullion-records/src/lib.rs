//! # Bullion Records
//!
//! Typed record storage over an ordered key-value ledger.
//!
//! ## Overview
//!
//! One generic [`RecordStore`] serves every bullion record kind:
//!
//! - **Bar**: a physical bar with location, serial, purity and weight
//! - **Buy** / **Sell**: customer orders against the vault
//! - **Send**: a transfer of grams between users
//! - **Trade**: a matched trade
//!
//! Each kind contributes only a static schema: its key prefix and its
//! ordered field names. Creation, lookup and range queries are shared.
//!
//! ## Key Concepts
//!
//! - **Record Key**: `<Kind>-<generated-id>`. Never a caller-supplied value.
//! - **Range Query**: all keys in `[<Kind>-, <Kind>.)`, ascending, returned
//!   as one JSON array of `{"Key", "Record"}` objects.
//! - **Paired Release**: every scan cursor is closed exactly once.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bullion_records::{Dispatcher, RecordKind, RecordStore};
//! use bullion_records::ledger::SqliteLedger;
//!
//! let ledger = SqliteLedger::open("ledger.db").unwrap();
//! let store = RecordStore::with_uuids(ledger);
//!
//! let key = store
//!     .create(RecordKind::Trade, &["ORD-1", "12.5", "user-3"])
//!     .unwrap();
//! let bytes = store.get_by_key(RecordKind::Trade, key.as_str()).unwrap();
//! assert!(bytes.is_some());
//!
//! // Or by function name, as a host runtime would invoke it.
//! let dispatcher = Dispatcher::new(store);
//! let response = dispatcher.invoke::<&str>("queryAllTrades", &[]);
//! assert!(response.is_ok());
//! ```
//!
//! ## Re-exports
//!
//! - `bullion_records::core` - Kinds, schemas, keys and validation
//! - `bullion_records::ledger` - Host ledger contract, SQLite and memory hosts

pub mod dispatch;
pub mod error;
pub mod id;
pub mod response;
pub mod store;

// Re-export component crates
pub use bullion_records_core as core;
pub use bullion_records_ledger as ledger;

// Re-export main types for convenience
pub use dispatch::{Dispatcher, Operation, Response, LEGACY_TRADE_QUERY_ROUTE};
pub use error::{RecordStoreError, Result};
pub use id::{validate_id, IdGenerationError, IdGenerator, UuidGenerator};
pub use response::{QueryEntry, QueryResults};
pub use store::{RecordStore, RecordStoreConfig};

// Re-export commonly used core types
pub use bullion_records_core::{Record, RecordKey, RecordKind, ScanRange};
