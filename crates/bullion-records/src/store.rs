//! The typed record store.
//!
//! One generic store serves every [`RecordKind`]. The kind's schema drives
//! arity checks, field validation, key prefixes and scan ranges.

use bytes::Bytes;

use bullion_records_core::{
    check_arity, validate_fields, Record, RecordKey, RecordKind, ScanRange,
};
use bullion_records_ledger::{Ledger, LedgerExt, RangeScan};

use crate::error::{RecordStoreError, Result};
use crate::id::{validate_id, IdGenerator, UuidGenerator};
use crate::response::{QueryEntry, QueryResults};

/// Configuration for the record store.
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Whether quantity and flag fields are validated on create.
    ///
    /// Arity is always checked.
    pub validate_field_types: bool,
    /// Whether each query response body is logged at debug level.
    pub log_query_results: bool,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            validate_field_types: true,
            log_query_results: false,
        }
    }
}

/// Generic CRUD over records of every kind.
///
/// Records are written under `<prefix>-<generated-id>`. Caller-supplied
/// correlation IDs (order IDs, user IDs) are only ever record fields.
pub struct RecordStore<L: Ledger, G: IdGenerator = UuidGenerator> {
    /// The host ledger.
    ledger: L,
    /// Identifier source for new records.
    ids: G,
    /// Configuration.
    config: RecordStoreConfig,
}

impl<L: Ledger> RecordStore<L> {
    /// Create a store that names records with time-ordered UUIDs.
    pub fn with_uuids(ledger: L) -> Self {
        Self::new(ledger, UuidGenerator, RecordStoreConfig::default())
    }
}

impl<L: Ledger, G: IdGenerator> RecordStore<L, G> {
    /// Create a new record store.
    pub fn new(ledger: L, ids: G, config: RecordStoreConfig) -> Self {
        Self { ledger, ids, config }
    }

    /// Get the ledger reference.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Get the configuration.
    pub fn config(&self) -> &RecordStoreConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a record from positional field values.
    ///
    /// `values` must match the kind's declared fields in count and order.
    /// Returns the generated key. Nothing is written on any failure.
    pub fn create<S: AsRef<str>>(&self, kind: RecordKind, values: &[S]) -> Result<RecordKey> {
        if self.config.validate_field_types {
            validate_fields(kind, values)?;
        } else {
            check_arity(
                &format!("create{}", kind.name()),
                kind.field_count(),
                values.len(),
            )?;
        }

        let id = self.ids.next_id()?;
        validate_id(&id)?;
        let key = RecordKey::new(kind, &id);

        let record = Record::from_positional(&key, values)?;
        let bytes = record.to_json()?;
        self.ledger.put_state(key.as_str(), Bytes::from(bytes))?;

        tracing::info!(kind = %kind, key = %key, "record created");
        Ok(key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up a record from positional arguments: exactly one key.
    pub fn get<S: AsRef<str>>(&self, kind: RecordKind, args: &[S]) -> Result<Option<Bytes>> {
        check_arity(&format!("get{}", kind.name()), 1, args.len())?;
        match args.first() {
            Some(key) => self.get_by_key(kind, key.as_ref()),
            None => Ok(None),
        }
    }

    /// Look up the raw bytes stored under `key`.
    ///
    /// Returns `None` if nothing is stored there, or if the key lies outside
    /// the kind's namespace.
    pub fn get_by_key(&self, kind: RecordKind, key: &str) -> Result<Option<Bytes>> {
        if !ScanRange::for_kind(kind).contains(key) {
            tracing::debug!(kind = %kind, key, "key outside kind namespace");
            return Ok(None);
        }
        Ok(self.ledger.get_optional(key)?)
    }

    /// Look up and decode a record, checking it against the kind's schema.
    pub fn get_record(&self, kind: RecordKind, key: &str) -> Result<Option<Record>> {
        let Some(bytes) = self.get_by_key(kind, key)? else {
            return Ok(None);
        };
        let corrupt = |reason: String| RecordStoreError::CorruptRecord {
            kind,
            key: key.to_string(),
            reason,
        };
        let record = Record::from_json(&bytes).map_err(|e| corrupt(e.to_string()))?;
        kind.schema()
            .check_record(&record)
            .map_err(|e| corrupt(e.to_string()))?;
        Ok(Some(record))
    }

    /// Every record of `kind`, in ascending key order.
    ///
    /// Either the whole range is returned or an error is; the scan cursor
    /// is released in both cases.
    pub fn query_all(&self, kind: RecordKind) -> Result<QueryResults> {
        let range = ScanRange::for_kind(kind);
        let mut scan = self.ledger.scan(&range)?;

        let mut entries = Vec::new();
        let folded = fold_scan(kind, &mut scan, &mut entries);
        let closed = scan.close();
        folded?;
        closed?;

        let results = QueryResults::new(entries);
        tracing::debug!(kind = %kind, count = results.len(), "query completed");
        if self.config.log_query_results {
            let body = results.to_json()?;
            tracing::debug!(kind = %kind, "query results: {}", String::from_utf8_lossy(&body));
        }
        Ok(results)
    }

    /// Every record of `kind`, rendered as a single JSON array.
    pub fn query_all_json(&self, kind: RecordKind) -> Result<Vec<u8>> {
        self.query_all(kind)?.to_json()
    }
}

fn fold_scan(
    kind: RecordKind,
    scan: &mut RangeScan<'_>,
    entries: &mut Vec<QueryEntry>,
) -> Result<()> {
    while scan.has_next() {
        let entry = scan.next_entry()?;
        entries.push(QueryEntry::from_ledger(kind, entry)?);
    }
    Ok(())
}
