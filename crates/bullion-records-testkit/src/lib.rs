//! # Bullion Records Testkit
//!
//! Testing utilities for bullion records.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Test doubles**: A counting, fault-injecting ledger wrapper and
//!   deterministic identifier sources
//! - **Golden vectors**: Known records with their exact stored bytes
//! - **Generators**: Proptest strategies for valid and invalid field values
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Cursor Release
//!
//! [`CountingLedger`] counts every cursor close, so a test can assert that
//! each scan released its cursor exactly once:
//!
//! ```rust
//! use bullion_records::RecordKind;
//! use bullion_records_testkit::{FaultPlan, TestFixture};
//!
//! let fixture = TestFixture::new();
//! fixture.create_samples(RecordKind::Sell, 3);
//! fixture.inject(FaultPlan::fail_read_after(1));
//!
//! assert!(fixture.store.query_all(RecordKind::Sell).is_err());
//! assert_eq!(fixture.counters().closed(), 1);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use bullion_records_testkit::{CreateParams, TestFixture};
//!
//! proptest! {
//!     #[test]
//!     fn create_then_get(params: CreateParams) {
//!         let fixture = TestFixture::new();
//!         let key = fixture.store.create(params.kind, &params.values).unwrap();
//!         prop_assert!(fixture.store.get_by_key(params.kind, key.as_str()).unwrap().is_some());
//!     }
//! }
//! ```

pub mod doubles;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use doubles::{CountingLedger, FailingIds, FaultPlan, LedgerCounters, SequentialIds};
pub use fixtures::{dispatcher_fixture, sample_values, total_keys, TestFixture};
pub use generators::{field_values, record_kind, wrong_arity_values, CreateParams};
pub use vectors::{all_vectors, record_from_vector, verify_all_vectors, GoldenVector};
