//! # Bullion Records Core
//!
//! Pure primitives for bullion records: kinds, schemas, keys, and scan ranges.
//!
//! This crate contains no I/O and no storage. It describes what a record of
//! each kind looks like and where it lives in the ledger's key space.
//!
//! ## Key Types
//!
//! - [`RecordKind`] - Discriminator selecting a [`KindSchema`]
//! - [`RecordKey`] - Primary key, `<prefix>-<generated-id>`
//! - [`ScanRange`] - Half-open key interval covering one kind
//! - [`Record`] - String-valued field mapping with canonical JSON encoding
//!
//! ## Validation
//!
//! Quantities and flags are checked at the boundary. See [`validation`].

pub mod error;
pub mod kind;
pub mod record;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use kind::{FieldSpec, FieldType, KindSchema, RecordKind, ID_FIELD, KEY_SEPARATOR};
pub use record::Record;
pub use types::{lex_successor, RecordKey, ScanRange};
pub use validation::{check_arity, validate_fields, validate_value, Flag, Quantity};
